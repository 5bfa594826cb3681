use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Patient;

use super::{datetime_field, opt_date_field, opt_uuid_field, uuid_field};

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: uuid_field(0, row.get(0)?)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: opt_date_field(3, row.get(3)?)?,
        doidol: opt_date_field(4, row.get(4)?)?,
        gender: row.get(5)?,
        phone: row.get(6)?,
        address: row.get(7)?,
        payer_id: uuid_field(8, row.get(8)?)?,
        status_id: uuid_field(9, row.get(9)?)?,
        attorney_id: opt_uuid_field(10, row.get(10)?)?,
        created_at: datetime_field(11, row.get(11)?)?,
    })
}

const COLUMNS: &str = "id, first_name, last_name, date_of_birth, doidol, gender, phone,
     address, payer_id, status_id, attorney_id, created_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, date_of_birth, doidol, gender, phone,
         address, payer_id, status_id, attorney_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.doidol.map(|d| d.to_string()),
            patient.gender,
            patient.phone,
            patient.address,
            patient.payer_id.to_string(),
            patient.status_id.to_string(),
            patient.attorney_id.map(|id| id.to_string()),
            patient.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {COLUMNS} FROM patients WHERE id = ?1"),
        params![id.to_string()],
        patient_from_row,
    );

    match result {
        Ok(patient) => Ok(Some(patient)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM patients ORDER BY created_at DESC, id"
    ))?;
    let rows = stmt.query_map([], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET first_name = ?2, last_name = ?3, date_of_birth = ?4, doidol = ?5,
         gender = ?6, phone = ?7, address = ?8, payer_id = ?9, status_id = ?10, attorney_id = ?11
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.doidol.map(|d| d.to_string()),
            patient.gender,
            patient.phone,
            patient.address,
            patient.payer_id.to_string(),
            patient.status_id.to_string(),
            patient.attorney_id.map(|id| id.to_string()),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
