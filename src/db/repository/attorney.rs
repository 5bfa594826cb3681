use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Attorney, AttorneyProfile, CaseManager, User, UserSummary};

use super::case_manager::{insert_case_manager, list_case_managers};
use super::user::{insert_user, update_user};
use super::{datetime_field, enum_field, uuid_field};

fn attorney_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Attorney> {
    Ok(Attorney {
        id: uuid_field(0, row.get(0)?)?,
        user_id: uuid_field(1, row.get(1)?)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        zip: row.get(5)?,
        phone: row.get(6)?,
        bar_number: row.get(7)?,
        created_at: datetime_field(8, row.get(8)?)?,
    })
}

/// Attorney joined with its user row, for the profile shape.
fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AttorneyProfile> {
    Ok(AttorneyProfile {
        attorney: attorney_from_row(row)?,
        user: UserSummary {
            id: uuid_field(1, row.get(1)?)?,
            name: row.get(9)?,
            email: row.get(10)?,
            role: enum_field(11, row.get(11)?)?,
        },
        case_managers: Vec::new(),
    })
}

pub fn insert_attorney(conn: &Connection, attorney: &Attorney) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO attorneys (id, user_id, address, city, state, zip, phone, bar_number, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            attorney.id.to_string(),
            attorney.user_id.to_string(),
            attorney.address,
            attorney.city,
            attorney.state,
            attorney.zip,
            attorney.phone,
            attorney.bar_number,
            attorney.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Insert user, attorney, and case managers as one unit. Nothing is visible
/// to other connections until the whole graph committed.
pub fn create_attorney_with_user(
    conn: &mut Connection,
    user: &User,
    attorney: &Attorney,
    case_managers: &[CaseManager],
) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    insert_user(&tx, user)?;
    insert_attorney(&tx, attorney)?;
    for cm in case_managers {
        insert_case_manager(&tx, cm)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_attorney(conn: &Connection, id: &Uuid) -> Result<Option<Attorney>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, address, city, state, zip, phone, bar_number, created_at
         FROM attorneys WHERE id = ?1",
        params![id.to_string()],
        attorney_from_row,
    );

    match result {
        Ok(attorney) => Ok(Some(attorney)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_attorney_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Attorney>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, address, city, state, zip, phone, bar_number, created_at
         FROM attorneys WHERE user_id = ?1",
        params![user_id.to_string()],
        attorney_from_row,
    );

    match result {
        Ok(attorney) => Ok(Some(attorney)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const PROFILE_SELECT: &str = "SELECT a.id, a.user_id, a.address, a.city, a.state, a.zip,
     a.phone, a.bar_number, a.created_at, u.name, u.email, u.role
     FROM attorneys a JOIN users u ON u.id = a.user_id";

pub fn get_attorney_profile(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<AttorneyProfile>, DatabaseError> {
    let result = conn.query_row(
        &format!("{PROFILE_SELECT} WHERE a.id = ?1"),
        params![id.to_string()],
        profile_from_row,
    );

    let mut profile = match result {
        Ok(profile) => profile,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    profile.case_managers = list_case_managers(conn, Some(id))?;
    Ok(Some(profile))
}

pub fn list_attorney_profiles(conn: &Connection) -> Result<Vec<AttorneyProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{PROFILE_SELECT} ORDER BY a.created_at DESC, a.id"))?;
    let rows = stmt.query_map([], profile_from_row)?;
    let mut profiles: Vec<AttorneyProfile> =
        rows.map(|r| r.map_err(DatabaseError::from)).collect::<Result<_, _>>()?;

    // One pass over all case managers instead of a query per attorney.
    let mut managers = list_case_managers(conn, None)?;
    for profile in &mut profiles {
        let (own, rest): (Vec<CaseManager>, Vec<CaseManager>) = managers
            .into_iter()
            .partition(|cm| cm.attorney_id == profile.attorney.id);
        profile.case_managers = own;
        managers = rest;
    }
    Ok(profiles)
}

pub fn update_attorney(conn: &Connection, attorney: &Attorney) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE attorneys SET address = ?2, city = ?3, state = ?4, zip = ?5,
         phone = ?6, bar_number = ?7 WHERE id = ?1",
        params![
            attorney.id.to_string(),
            attorney.address,
            attorney.city,
            attorney.state,
            attorney.zip,
            attorney.phone,
            attorney.bar_number,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Attorney".into(),
            id: attorney.id.to_string(),
        });
    }
    Ok(())
}

/// Update the attorney profile and its linked user row together, so a
/// password or email change never lands without the profile change.
pub fn update_attorney_with_user(
    conn: &mut Connection,
    attorney: &Attorney,
    user: &User,
) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    update_user(&tx, user)?;
    update_attorney(&tx, attorney)?;
    tx.commit()?;
    Ok(())
}

/// Delete an attorney together with its linked user. The user delete
/// cascades back through the attorney row and its case managers; patients
/// keep their rows with `attorney_id` cleared.
pub fn delete_attorney_cascade(conn: &mut Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    let user_id: String = match tx.query_row(
        "SELECT user_id FROM attorneys WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    ) {
        Ok(user_id) => user_id,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(DatabaseError::NotFound {
                entity_type: "Attorney".into(),
                id: id.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    tx.commit()?;
    Ok(())
}
