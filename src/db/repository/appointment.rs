use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Appointment;

use super::{date_field, datetime_field, opt_uuid_field, uuid_field};

fn appointment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: uuid_field(0, row.get(0)?)?,
        patient_id: uuid_field(1, row.get(1)?)?,
        doctor_id: opt_uuid_field(2, row.get(2)?)?,
        exam_id: opt_uuid_field(3, row.get(3)?)?,
        date: date_field(4, row.get(4)?)?,
        time: row.get(5)?,
        appointment_type: row.get(6)?,
        status: row.get(7)?,
        notes: row.get(8)?,
        created_at: datetime_field(9, row.get(9)?)?,
    })
}

const COLUMNS: &str = "id, patient_id, doctor_id, exam_id, date, time, type, status, notes,
     created_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, exam_id, date, time, type,
         status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.exam_id.map(|id| id.to_string()),
            appt.date.to_string(),
            appt.time,
            appt.appointment_type,
            appt.status,
            appt.notes,
            appt.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1"),
        params![id.to_string()],
        appointment_from_row,
    );

    match result {
        Ok(appt) => Ok(Some(appt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_appointments(
    conn: &Connection,
    patient_id: Option<&Uuid>,
) -> Result<Vec<Appointment>, DatabaseError> {
    match patient_id {
        Some(patient_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM appointments WHERE patient_id = ?1 ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map(params![patient_id.to_string()], appointment_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM appointments ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map([], appointment_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET patient_id = ?2, doctor_id = ?3, exam_id = ?4, date = ?5,
         time = ?6, type = ?7, status = ?8, notes = ?9 WHERE id = ?1",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.exam_id.map(|id| id.to_string()),
            appt.date.to_string(),
            appt.time,
            appt.appointment_type,
            appt.status,
            appt.notes,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: appt.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
