//! Imaging/treatment facility endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Facility;

use super::{patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct FacilityQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFacility {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub status: Option<Option<String>>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<FacilityQuery>,
) -> Result<Json<Vec<Facility>>, ApiError> {
    let conn = ctx.db.connect()?;
    let facilities = match query.id {
        Some(id) => repository::get_facility(&conn, &id)?.into_iter().collect(),
        None => repository::list_facilities(&conn)?,
    };
    Ok(Json(facilities))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Facility>, ApiError> {
    let conn = ctx.db.connect()?;
    let facility = repository::get_facility(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Facility not found".into()))?;
    Ok(Json(facility))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewFacility>,
) -> Result<Json<Facility>, ApiError> {
    auth.require_staff()?;
    let facility = Facility {
        id: Uuid::new_v4(),
        name: required(input.name, "name")?,
        address: input.address.filter(|s| !s.trim().is_empty()),
        status: input.status.filter(|s| !s.trim().is_empty()),
        created_at: Utc::now(),
    };
    let conn = ctx.db.connect()?;
    repository::insert_facility(&conn, &facility)?;
    Ok(Json(facility))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<FacilityPatch>,
) -> Result<Json<Facility>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<FacilityQuery>,
    Json(patch): Json<FacilityPatch>,
) -> Result<Json<Facility>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: FacilityPatch,
) -> Result<Json<Facility>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut facility = repository::get_facility(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Facility not found".into()))?;

    if let Some(name) = patch.name {
        facility.name = required(name, "name")?;
    }
    if let Some(address) = patch.address {
        facility.address = address.filter(|s| !s.trim().is_empty());
    }
    if let Some(status) = patch.status {
        facility.status = status.filter(|s| !s.trim().is_empty());
    }

    repository::update_facility(&conn, &facility)?;
    Ok(Json(facility))
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
    Query(query): Query<FacilityQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_facility(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
