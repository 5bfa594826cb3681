use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Doctor;

use super::{datetime_field, uuid_field};

fn doctor_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: uuid_field(0, row.get(0)?)?,
        name: row.get(1)?,
        clinic_name: row.get(2)?,
        phone_number: row.get(3)?,
        status: row.get(4)?,
        created_at: datetime_field(5, row.get(5)?)?,
    })
}

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, name, clinic_name, phone_number, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.clinic_name,
            doctor.phone_number,
            doctor.status,
            doctor.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, clinic_name, phone_number, status, created_at
         FROM doctors WHERE id = ?1",
        params![id.to_string()],
        doctor_from_row,
    );

    match result {
        Ok(doctor) => Ok(Some(doctor)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, clinic_name, phone_number, status, created_at
         FROM doctors ORDER BY created_at DESC, id",
    )?;
    let rows = stmt.query_map([], doctor_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET name = ?2, clinic_name = ?3, phone_number = ?4, status = ?5
         WHERE id = ?1",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.clinic_name,
            doctor.phone_number,
            doctor.status,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: doctor.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_doctor(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
