//! Patient/procedure status endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Status;

use super::{patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStatus {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub color: Option<Option<String>>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Status>>, ApiError> {
    let conn = ctx.db.connect()?;
    let statuses = match query.id {
        Some(id) => repository::get_status(&conn, &id)?.into_iter().collect(),
        None => repository::list_statuses(&conn)?,
    };
    Ok(Json(statuses))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Status>, ApiError> {
    let conn = ctx.db.connect()?;
    let status = repository::get_status(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Status not found".into()))?;
    Ok(Json(status))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewStatus>,
) -> Result<Json<Status>, ApiError> {
    auth.require_staff()?;
    let name = required(input.name, "name")?;

    let conn = ctx.db.connect()?;
    if repository::get_status_by_name(&conn, &name)?.is_some() {
        return Err(ApiError::conflict("name", "Status name already in use"));
    }

    let status = Status {
        id: Uuid::new_v4(),
        name,
        color: input.color.filter(|c| !c.trim().is_empty()),
        created_at: Utc::now(),
    };
    repository::insert_status(&conn, &status)?;
    Ok(Json(status))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<Status>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<StatusQuery>,
    Json(patch): Json<StatusPatch>,
) -> Result<Json<Status>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: StatusPatch,
) -> Result<Json<Status>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut status = repository::get_status(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Status not found".into()))?;

    if let Some(name) = patch.name {
        let name = required(name, "name")?;
        if name != status.name && repository::get_status_by_name(&conn, &name)?.is_some() {
            return Err(ApiError::conflict("name", "Status name already in use"));
        }
        status.name = name;
    }
    if let Some(color) = patch.color {
        status.color = color.filter(|c| !c.trim().is_empty());
    }

    repository::update_status(&conn, &status)?;
    Ok(Json(status))
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
    Query(query): Query<StatusQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_status(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
