//! Performing physician endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Physician;

use super::{default_true, patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct PhysicianQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhysician {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicianPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub status: Option<Option<String>>,
    pub is_active: Option<bool>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<PhysicianQuery>,
) -> Result<Json<Vec<Physician>>, ApiError> {
    let conn = ctx.db.connect()?;
    let physicians = match query.id {
        Some(id) => repository::get_physician(&conn, &id)?.into_iter().collect(),
        None => repository::list_physicians(&conn)?,
    };
    Ok(Json(physicians))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Physician>, ApiError> {
    let conn = ctx.db.connect()?;
    let physician = repository::get_physician(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Physician not found".into()))?;
    Ok(Json(physician))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewPhysician>,
) -> Result<Json<Physician>, ApiError> {
    auth.require_staff()?;
    let name = required(input.name, "name")?;
    let email = required(input.email, "email")?;

    let conn = ctx.db.connect()?;
    if repository::get_physician_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::conflict("email", "Physician email already in use"));
    }

    let physician = Physician {
        id: Uuid::new_v4(),
        name,
        email,
        status: input.status.filter(|s| !s.trim().is_empty()),
        is_active: input.is_active,
        created_at: Utc::now(),
    };
    repository::insert_physician(&conn, &physician)?;
    Ok(Json(physician))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PhysicianPatch>,
) -> Result<Json<Physician>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PhysicianQuery>,
    Json(patch): Json<PhysicianPatch>,
) -> Result<Json<Physician>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: PhysicianPatch,
) -> Result<Json<Physician>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut physician = repository::get_physician(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Physician not found".into()))?;

    if let Some(name) = patch.name {
        physician.name = required(name, "name")?;
    }
    if let Some(email) = patch.email {
        let email = required(email, "email")?;
        if email != physician.email
            && repository::get_physician_by_email(&conn, &email)?.is_some()
        {
            return Err(ApiError::conflict("email", "Physician email already in use"));
        }
        physician.email = email;
    }
    if let Some(status) = patch.status {
        physician.status = status.filter(|s| !s.trim().is_empty());
    }
    if let Some(is_active) = patch.is_active {
        physician.is_active = is_active;
    }

    repository::update_physician(&conn, &physician)?;
    Ok(Json(physician))
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
    Query(query): Query<PhysicianQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_physician(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
