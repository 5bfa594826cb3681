//! Case-manager endpoints.
//!
//! A case manager belongs to an attorney; mutations are allowed for admins
//! and for the user who owns that attorney record.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::format::normalize_phone;
use crate::models::CaseManager;

use super::{id_field, patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct CaseManagerQuery {
    pub id: Option<Uuid>,
    pub attorney_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaseManager {
    pub attorney_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseManagerPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub phone: Option<Option<String>>,
}

fn clean_phone(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_phone(&v))
        .filter(|v| !v.is_empty())
}

/// Resolve the parent attorney and check the caller may touch its managers.
fn require_attorney_access(
    conn: &Connection,
    auth: &AuthContext,
    attorney_id: &Uuid,
) -> Result<(), ApiError> {
    let attorney = repository::get_attorney(conn, attorney_id)?
        .ok_or_else(|| ApiError::NotFound("Attorney not found".into()))?;
    auth.require_owner(attorney.user_id)
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<CaseManagerQuery>,
) -> Result<Json<Vec<CaseManager>>, ApiError> {
    let conn = ctx.db.connect()?;
    let managers = match query.id {
        Some(id) => repository::get_case_manager(&conn, &id)?.into_iter().collect(),
        None => repository::list_case_managers(&conn, query.attorney_id.as_ref())?,
    };
    Ok(Json(managers))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseManager>, ApiError> {
    let conn = ctx.db.connect()?;
    let manager = repository::get_case_manager(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Case manager not found".into()))?;
    Ok(Json(manager))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewCaseManager>,
) -> Result<Json<CaseManager>, ApiError> {
    let attorney_id = id_field(&input.attorney_id, "attorneyId")?;
    let conn = ctx.db.connect()?;
    require_attorney_access(&conn, &auth, &attorney_id)?;

    let manager = CaseManager {
        id: Uuid::new_v4(),
        attorney_id,
        name: required(input.name, "name")?,
        email: input.email.filter(|s| !s.trim().is_empty()),
        phone: clean_phone(input.phone),
        created_at: Utc::now(),
    };
    repository::insert_case_manager(&conn, &manager)?;
    Ok(Json(manager))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CaseManagerPatch>,
) -> Result<Json<CaseManager>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<CaseManagerQuery>,
    Json(patch): Json<CaseManagerPatch>,
) -> Result<Json<CaseManager>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: CaseManagerPatch,
) -> Result<Json<CaseManager>, ApiError> {
    let conn = ctx.db.connect()?;
    let mut manager = repository::get_case_manager(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Case manager not found".into()))?;
    require_attorney_access(&conn, &auth, &manager.attorney_id)?;

    if let Some(name) = patch.name {
        manager.name = required(name, "name")?;
    }
    if let Some(email) = patch.email {
        manager.email = email.filter(|s| !s.trim().is_empty());
    }
    if let Some(phone) = patch.phone {
        manager.phone = clean_phone(phone);
    }

    repository::update_case_manager(&conn, &manager)?;
    Ok(Json(manager))
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
    Query(query): Query<CaseManagerQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    let conn = ctx.db.connect()?;
    let manager = repository::get_case_manager(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Case manager not found".into()))?;
    require_attorney_access(&conn, &auth, &manager.attorney_id)?;
    repository::delete_case_manager(&conn, &id)?;
    Ok(Json(Deleted { deleted: id }))
}
