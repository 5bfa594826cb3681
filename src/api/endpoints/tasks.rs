//! Staff task endpoints.
//!
//! A task with an assignee is owned by that user: only the assignee or an
//! admin may change or delete it. Unassigned tasks follow the usual staff
//! gate.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::enums::{TaskPriority, TaskStatus};
use crate::models::Task;

use super::{date_field, id_field, patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub assignee_id: Option<Option<String>>,
}

/// Closed-set fields reject unknown tokens with a 400, not a 422.
fn priority_field(value: &str) -> Result<TaskPriority, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("priority", "Expected LOW, MEDIUM, or HIGH"))
}

fn status_field(value: &str) -> Result<TaskStatus, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("status", "Expected PENDING, IN_PROGRESS, or COMPLETED"))
}

fn opt_due_date(value: Option<String>) -> Result<Option<chrono::NaiveDate>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| date_field(&v, "dueDate"))
        .transpose()
}

fn opt_assignee(value: Option<String>) -> Result<Option<Uuid>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| id_field(&v, "assigneeId"))
        .transpose()
}

fn require_task_access(auth: &AuthContext, task: &Task) -> Result<(), ApiError> {
    match task.assignee_id {
        Some(assignee) => auth.require_owner(assignee),
        None => auth.require_staff(),
    }
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let conn = ctx.db.connect()?;
    let tasks = match query.id {
        Some(id) => repository::get_task(&conn, &id)?.into_iter().collect(),
        None => repository::list_tasks(&conn, query.assignee_id.as_ref())?,
    };
    Ok(Json(tasks))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let conn = ctx.db.connect()?;
    let task = repository::get_task(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(task))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewTask>,
) -> Result<Json<Task>, ApiError> {
    auth.require_staff()?;
    let task = Task {
        id: Uuid::new_v4(),
        title: required(input.title, "title")?,
        description: input.description.filter(|s| !s.trim().is_empty()),
        priority: match input.priority {
            Some(p) => priority_field(&p)?,
            None => TaskPriority::Medium,
        },
        status: match input.status {
            Some(s) => status_field(&s)?,
            None => TaskStatus::Pending,
        },
        due_date: opt_due_date(input.due_date)?,
        assignee_id: opt_assignee(input.assignee_id)?,
        created_at: Utc::now(),
    };
    let conn = ctx.db.connect()?;
    repository::insert_task(&conn, &task)?;
    Ok(Json(task))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskQuery>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: TaskPatch,
) -> Result<Json<Task>, ApiError> {
    let conn = ctx.db.connect()?;
    let mut task = repository::get_task(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    require_task_access(&auth, &task)?;

    if let Some(title) = patch.title {
        task.title = required(title, "title")?;
    }
    if let Some(description) = patch.description {
        task.description = description.filter(|s| !s.trim().is_empty());
    }
    if let Some(priority) = patch.priority {
        task.priority = priority_field(&priority)?;
    }
    if let Some(status) = patch.status {
        task.status = status_field(&status)?;
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = opt_due_date(due_date)?;
    }
    if let Some(assignee_id) = patch.assignee_id {
        task.assignee_id = opt_assignee(assignee_id)?;
    }

    repository::update_task(&conn, &task)?;
    Ok(Json(task))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, id)
}

pub async fn remove_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    let conn = ctx.db.connect()?;
    let task = repository::get_task(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    require_task_access(&auth, &task)?;
    repository::delete_task(&conn, &id)?;
    Ok(Json(Deleted { deleted: id }))
}
