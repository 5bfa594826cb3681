use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Procedure;

use super::{date_field, datetime_field, uuid_field};

fn procedure_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Procedure> {
    Ok(Procedure {
        id: uuid_field(0, row.get(0)?)?,
        exam_id: uuid_field(1, row.get(1)?)?,
        facility_id: uuid_field(2, row.get(2)?)?,
        physician_id: uuid_field(3, row.get(3)?)?,
        patient_id: uuid_field(4, row.get(4)?)?,
        status_id: uuid_field(5, row.get(5)?)?,
        schedule_date: date_field(6, row.get(6)?)?,
        schedule_time: row.get(7)?,
        is_completed: row.get::<_, i32>(8)? != 0,
        lop: row.get(9)?,
        created_at: datetime_field(10, row.get(10)?)?,
    })
}

const COLUMNS: &str = "id, exam_id, facility_id, physician_id, patient_id, status_id,
     schedule_date, schedule_time, is_completed, lop, created_at";

pub fn insert_procedure(conn: &Connection, procedure: &Procedure) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO procedures (id, exam_id, facility_id, physician_id, patient_id, status_id,
         schedule_date, schedule_time, is_completed, lop, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            procedure.id.to_string(),
            procedure.exam_id.to_string(),
            procedure.facility_id.to_string(),
            procedure.physician_id.to_string(),
            procedure.patient_id.to_string(),
            procedure.status_id.to_string(),
            procedure.schedule_date.to_string(),
            procedure.schedule_time,
            procedure.is_completed as i32,
            procedure.lop,
            procedure.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_procedure(conn: &Connection, id: &Uuid) -> Result<Option<Procedure>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {COLUMNS} FROM procedures WHERE id = ?1"),
        params![id.to_string()],
        procedure_from_row,
    );

    match result {
        Ok(procedure) => Ok(Some(procedure)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_procedures(
    conn: &Connection,
    patient_id: Option<&Uuid>,
) -> Result<Vec<Procedure>, DatabaseError> {
    match patient_id {
        Some(patient_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM procedures WHERE patient_id = ?1 ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map(params![patient_id.to_string()], procedure_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM procedures ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map([], procedure_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

pub fn update_procedure(conn: &Connection, procedure: &Procedure) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE procedures SET exam_id = ?2, facility_id = ?3, physician_id = ?4,
         patient_id = ?5, status_id = ?6, schedule_date = ?7, schedule_time = ?8,
         is_completed = ?9, lop = ?10 WHERE id = ?1",
        params![
            procedure.id.to_string(),
            procedure.exam_id.to_string(),
            procedure.facility_id.to_string(),
            procedure.physician_id.to_string(),
            procedure.patient_id.to_string(),
            procedure.status_id.to_string(),
            procedure.schedule_date.to_string(),
            procedure.schedule_time,
            procedure.is_completed as i32,
            procedure.lop,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Procedure".into(),
            id: procedure.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_procedure(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM procedures WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Procedure".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
