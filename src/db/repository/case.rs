use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Case;

use super::{datetime_field, opt_date_field, uuid_field};

fn case_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Case> {
    Ok(Case {
        id: uuid_field(0, row.get(0)?)?,
        patient_id: uuid_field(1, row.get(1)?)?,
        case_number: row.get(2)?,
        filing_date: opt_date_field(3, row.get(3)?)?,
        status: row.get(4)?,
        created_at: datetime_field(5, row.get(5)?)?,
    })
}

pub fn insert_case(conn: &Connection, case: &Case) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO cases (id, patient_id, case_number, filing_date, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            case.id.to_string(),
            case.patient_id.to_string(),
            case.case_number,
            case.filing_date.map(|d| d.to_string()),
            case.status,
            case.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_case(conn: &Connection, id: &Uuid) -> Result<Option<Case>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, patient_id, case_number, filing_date, status, created_at
         FROM cases WHERE id = ?1",
        params![id.to_string()],
        case_from_row,
    );

    match result {
        Ok(case) => Ok(Some(case)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_case_by_number(
    conn: &Connection,
    case_number: &str,
) -> Result<Option<Case>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, patient_id, case_number, filing_date, status, created_at
         FROM cases WHERE case_number = ?1",
        params![case_number],
        case_from_row,
    );

    match result {
        Ok(case) => Ok(Some(case)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_cases(conn: &Connection, patient_id: Option<&Uuid>) -> Result<Vec<Case>, DatabaseError> {
    const SQL: &str =
        "SELECT id, patient_id, case_number, filing_date, status, created_at FROM cases";
    match patient_id {
        Some(patient_id) => {
            let mut stmt =
                conn.prepare(&format!("{SQL} WHERE patient_id = ?1 ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map(params![patient_id.to_string()], case_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SQL} ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map([], case_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

pub fn update_case(conn: &Connection, case: &Case) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE cases SET patient_id = ?2, case_number = ?3, filing_date = ?4, status = ?5
         WHERE id = ?1",
        params![
            case.id.to_string(),
            case.patient_id.to_string(),
            case.case_number,
            case.filing_date.map(|d| d.to_string()),
            case.status,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Case".into(),
            id: case.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_case(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM cases WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Case".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
