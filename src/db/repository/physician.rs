use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Physician;

use super::{datetime_field, uuid_field};

fn physician_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Physician> {
    Ok(Physician {
        id: uuid_field(0, row.get(0)?)?,
        name: row.get(1)?,
        email: row.get(2)?,
        status: row.get(3)?,
        is_active: row.get::<_, i32>(4)? != 0,
        created_at: datetime_field(5, row.get(5)?)?,
    })
}

pub fn insert_physician(conn: &Connection, physician: &Physician) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO physicians (id, name, email, status, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            physician.id.to_string(),
            physician.name,
            physician.email,
            physician.status,
            physician.is_active as i32,
            physician.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_physician(conn: &Connection, id: &Uuid) -> Result<Option<Physician>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, email, status, is_active, created_at
         FROM physicians WHERE id = ?1",
        params![id.to_string()],
        physician_from_row,
    );

    match result {
        Ok(physician) => Ok(Some(physician)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_physician_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Physician>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, email, status, is_active, created_at
         FROM physicians WHERE email = ?1",
        params![email],
        physician_from_row,
    );

    match result {
        Ok(physician) => Ok(Some(physician)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_physicians(conn: &Connection) -> Result<Vec<Physician>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, status, is_active, created_at
         FROM physicians ORDER BY created_at DESC, id",
    )?;
    let rows = stmt.query_map([], physician_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_physician(conn: &Connection, physician: &Physician) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE physicians SET name = ?2, email = ?3, status = ?4, is_active = ?5
         WHERE id = ?1",
        params![
            physician.id.to_string(),
            physician.name,
            physician.email,
            physician.status,
            physician.is_active as i32,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Physician".into(),
            id: physician.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_physician(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM physicians WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Physician".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
