use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Task;

use super::{datetime_field, enum_field, opt_date_field, opt_uuid_field, uuid_field};

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: uuid_field(0, row.get(0)?)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: enum_field(3, row.get(3)?)?,
        status: enum_field(4, row.get(4)?)?,
        due_date: opt_date_field(5, row.get(5)?)?,
        assignee_id: opt_uuid_field(6, row.get(6)?)?,
        created_at: datetime_field(7, row.get(7)?)?,
    })
}

const COLUMNS: &str = "id, title, description, priority, status, due_date, assignee_id,
     created_at";

pub fn insert_task(conn: &Connection, task: &Task) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tasks (id, title, description, priority, status, due_date, assignee_id,
         created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.id.to_string(),
            task.title,
            task.description,
            task.priority.as_str(),
            task.status.as_str(),
            task.due_date.map(|d| d.to_string()),
            task.assignee_id.map(|id| id.to_string()),
            task.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_task(conn: &Connection, id: &Uuid) -> Result<Option<Task>, DatabaseError> {
    let result = conn.query_row(
        &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"),
        params![id.to_string()],
        task_from_row,
    );

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_tasks(
    conn: &Connection,
    assignee_id: Option<&Uuid>,
) -> Result<Vec<Task>, DatabaseError> {
    match assignee_id {
        Some(assignee_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM tasks WHERE assignee_id = ?1 ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map(params![assignee_id.to_string()], task_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM tasks ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map([], task_from_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

pub fn update_task(conn: &Connection, task: &Task) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE tasks SET title = ?2, description = ?3, priority = ?4, status = ?5,
         due_date = ?6, assignee_id = ?7 WHERE id = ?1",
        params![
            task.id.to_string(),
            task.title,
            task.description,
            task.priority.as_str(),
            task.status.as_str(),
            task.due_date.map(|d| d.to_string()),
            task.assignee_id.map(|id| id.to_string()),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Task".into(),
            id: task.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_task(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Task".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
