use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Exam, SubExam};

use super::{datetime_field, uuid_field};

fn exam_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exam> {
    Ok(Exam {
        id: uuid_field(0, row.get(0)?)?,
        name: row.get(1)?,
        category: row.get(2)?,
        status: row.get(3)?,
        created_at: datetime_field(4, row.get(4)?)?,
    })
}

fn sub_exam_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubExam> {
    Ok(SubExam {
        id: uuid_field(0, row.get(0)?)?,
        exam_id: uuid_field(1, row.get(1)?)?,
        name: row.get(2)?,
        price: row.get(3)?,
        created_at: datetime_field(4, row.get(4)?)?,
    })
}

pub fn insert_exam(conn: &Connection, exam: &Exam) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO exams (id, name, category, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            exam.id.to_string(),
            exam.name,
            exam.category,
            exam.status,
            exam.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Insert an exam and its sub-exams as one unit.
pub fn create_exam_with_sub_exams(
    conn: &mut Connection,
    exam: &Exam,
    sub_exams: &[SubExam],
) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    insert_exam(&tx, exam)?;
    for sub in sub_exams {
        insert_sub_exam(&tx, sub)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_exam(conn: &Connection, id: &Uuid) -> Result<Option<Exam>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, category, status, created_at FROM exams WHERE id = ?1",
        params![id.to_string()],
        exam_from_row,
    );

    match result {
        Ok(exam) => Ok(Some(exam)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_exams(conn: &Connection) -> Result<Vec<Exam>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, status, created_at FROM exams ORDER BY created_at DESC, id",
    )?;
    let rows = stmt.query_map([], exam_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_exam(conn: &Connection, exam: &Exam) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE exams SET name = ?2, category = ?3, status = ?4 WHERE id = ?1",
        params![
            exam.id.to_string(),
            exam.name,
            exam.category,
            exam.status,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Exam".into(),
            id: exam.id.to_string(),
        });
    }
    Ok(())
}

/// Sub-exams go with the exam via the FK cascade.
pub fn delete_exam(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM exams WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Exam".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn insert_sub_exam(conn: &Connection, sub: &SubExam) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sub_exams (id, exam_id, name, price, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            sub.id.to_string(),
            sub.exam_id.to_string(),
            sub.name,
            sub.price,
            sub.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_sub_exam(conn: &Connection, id: &Uuid) -> Result<Option<SubExam>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, exam_id, name, price, created_at FROM sub_exams WHERE id = ?1",
        params![id.to_string()],
        sub_exam_from_row,
    );

    match result {
        Ok(sub) => Ok(Some(sub)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_sub_exams(
    conn: &Connection,
    exam_id: Option<&Uuid>,
) -> Result<Vec<SubExam>, DatabaseError> {
    const SQL: &str = "SELECT id, exam_id, name, price, created_at FROM sub_exams";
    match exam_id {
        Some(exam_id) => {
            let mut stmt =
                conn.prepare(&format!("{SQL} WHERE exam_id = ?1 ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map(params![exam_id.to_string()], sub_exam_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SQL} ORDER BY created_at DESC, id"))?;
            let rows = stmt.query_map([], sub_exam_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

pub fn update_sub_exam(conn: &Connection, sub: &SubExam) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE sub_exams SET exam_id = ?2, name = ?3, price = ?4 WHERE id = ?1",
        params![
            sub.id.to_string(),
            sub.exam_id.to_string(),
            sub.name,
            sub.price,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "SubExam".into(),
            id: sub.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_sub_exam(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM sub_exams WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "SubExam".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
