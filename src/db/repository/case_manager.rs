use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::CaseManager;

use super::{datetime_field, uuid_field};

fn case_manager_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CaseManager> {
    Ok(CaseManager {
        id: uuid_field(0, row.get(0)?)?,
        attorney_id: uuid_field(1, row.get(1)?)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        created_at: datetime_field(5, row.get(5)?)?,
    })
}

pub fn insert_case_manager(conn: &Connection, cm: &CaseManager) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO case_managers (id, attorney_id, name, email, phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            cm.id.to_string(),
            cm.attorney_id.to_string(),
            cm.name,
            cm.email,
            cm.phone,
            cm.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_case_manager(conn: &Connection, id: &Uuid) -> Result<Option<CaseManager>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, attorney_id, name, email, phone, created_at
         FROM case_managers WHERE id = ?1",
        params![id.to_string()],
        case_manager_from_row,
    );

    match result {
        Ok(cm) => Ok(Some(cm)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_case_managers(
    conn: &Connection,
    attorney_id: Option<&Uuid>,
) -> Result<Vec<CaseManager>, DatabaseError> {
    const SQL: &str = "SELECT id, attorney_id, name, email, phone, created_at FROM case_managers";
    match attorney_id {
        Some(attorney_id) => {
            let mut stmt =
                conn.prepare(&format!("{SQL} WHERE attorney_id = ?1 ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map(params![attorney_id.to_string()], case_manager_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SQL} ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map([], case_manager_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

pub fn update_case_manager(conn: &Connection, cm: &CaseManager) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE case_managers SET attorney_id = ?2, name = ?3, email = ?4, phone = ?5
         WHERE id = ?1",
        params![
            cm.id.to_string(),
            cm.attorney_id.to_string(),
            cm.name,
            cm.email,
            cm.phone,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "CaseManager".into(),
            id: cm.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_case_manager(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM case_managers WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "CaseManager".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
