use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Payer;

use super::{datetime_field, uuid_field};

fn payer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payer> {
    Ok(Payer {
        id: uuid_field(0, row.get(0)?)?,
        name: row.get(1)?,
        is_active: row.get::<_, i32>(2)? != 0,
        created_at: datetime_field(3, row.get(3)?)?,
    })
}

pub fn insert_payer(conn: &Connection, payer: &Payer) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payers (id, name, is_active, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            payer.id.to_string(),
            payer.name,
            payer.is_active as i32,
            payer.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_payer(conn: &Connection, id: &Uuid) -> Result<Option<Payer>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, is_active, created_at FROM payers WHERE id = ?1",
        params![id.to_string()],
        payer_from_row,
    );

    match result {
        Ok(payer) => Ok(Some(payer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_payer_by_name(conn: &Connection, name: &str) -> Result<Option<Payer>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, is_active, created_at FROM payers WHERE name = ?1",
        params![name],
        payer_from_row,
    );

    match result {
        Ok(payer) => Ok(Some(payer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_payers(conn: &Connection) -> Result<Vec<Payer>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_active, created_at FROM payers ORDER BY created_at DESC, id",
    )?;
    let rows = stmt.query_map([], payer_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_payer(conn: &Connection, payer: &Payer) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE payers SET name = ?2, is_active = ?3 WHERE id = ?1",
        params![payer.id.to_string(), payer.name, payer.is_active as i32],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Payer".into(),
            id: payer.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_payer(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM payers WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Payer".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
