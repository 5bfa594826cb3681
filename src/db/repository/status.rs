use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Status;

use super::{datetime_field, uuid_field};

fn status_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Status> {
    Ok(Status {
        id: uuid_field(0, row.get(0)?)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: datetime_field(3, row.get(3)?)?,
    })
}

pub fn insert_status(conn: &Connection, status: &Status) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO statuses (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            status.id.to_string(),
            status.name,
            status.color,
            status.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_status(conn: &Connection, id: &Uuid) -> Result<Option<Status>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, color, created_at FROM statuses WHERE id = ?1",
        params![id.to_string()],
        status_from_row,
    );

    match result {
        Ok(status) => Ok(Some(status)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_status_by_name(conn: &Connection, name: &str) -> Result<Option<Status>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, color, created_at FROM statuses WHERE name = ?1",
        params![name],
        status_from_row,
    );

    match result {
        Ok(status) => Ok(Some(status)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_statuses(conn: &Connection) -> Result<Vec<Status>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color, created_at FROM statuses ORDER BY created_at DESC, id",
    )?;
    let rows = stmt.query_map([], status_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_status(conn: &Connection, status: &Status) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE statuses SET name = ?2, color = ?3 WHERE id = ?1",
        params![status.id.to_string(), status.name, status.color],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Status".into(),
            id: status.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_status(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM statuses WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Status".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
