use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Event;

use super::{datetime_field, opt_uuid_field, uuid_field};

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: uuid_field(0, row.get(0)?)?,
        action: row.get(1)?,
        detail: row.get(2)?,
        user_id: opt_uuid_field(3, row.get(3)?)?,
        patient_id: opt_uuid_field(4, row.get(4)?)?,
        created_at: datetime_field(5, row.get(5)?)?,
    })
}

pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO events (id, action, detail, user_id, patient_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.id.to_string(),
            event.action,
            event.detail,
            event.user_id.map(|id| id.to_string()),
            event.patient_id.map(|id| id.to_string()),
            event.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_event(conn: &Connection, id: &Uuid) -> Result<Option<Event>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, action, detail, user_id, patient_id, created_at FROM events WHERE id = ?1",
        params![id.to_string()],
        event_from_row,
    );

    match result {
        Ok(event) => Ok(Some(event)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_events(
    conn: &Connection,
    patient_id: Option<&Uuid>,
) -> Result<Vec<Event>, DatabaseError> {
    const SQL: &str = "SELECT id, action, detail, user_id, patient_id, created_at FROM events";
    match patient_id {
        Some(patient_id) => {
            let mut stmt =
                conn.prepare(&format!("{SQL} WHERE patient_id = ?1 ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map(params![patient_id.to_string()], event_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SQL} ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map([], event_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}
