use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Facility;

use super::{datetime_field, uuid_field};

fn facility_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Facility> {
    Ok(Facility {
        id: uuid_field(0, row.get(0)?)?,
        name: row.get(1)?,
        address: row.get(2)?,
        status: row.get(3)?,
        created_at: datetime_field(4, row.get(4)?)?,
    })
}

pub fn insert_facility(conn: &Connection, facility: &Facility) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO facilities (id, name, address, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            facility.id.to_string(),
            facility.name,
            facility.address,
            facility.status,
            facility.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_facility(conn: &Connection, id: &Uuid) -> Result<Option<Facility>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, address, status, created_at FROM facilities WHERE id = ?1",
        params![id.to_string()],
        facility_from_row,
    );

    match result {
        Ok(facility) => Ok(Some(facility)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_facilities(conn: &Connection) -> Result<Vec<Facility>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, address, status, created_at FROM facilities
         ORDER BY created_at DESC, id",
    )?;
    let rows = stmt.query_map([], facility_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_facility(conn: &Connection, facility: &Facility) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE facilities SET name = ?2, address = ?3, status = ?4 WHERE id = ?1",
        params![
            facility.id.to_string(),
            facility.name,
            facility.address,
            facility.status,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Facility".into(),
            id: facility.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_facility(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM facilities WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Facility".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
