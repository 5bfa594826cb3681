//! Referring doctor endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::format::normalize_phone;
use crate::models::Doctor;

use super::{patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct DoctorQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub name: String,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub clinic_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub status: Option<Option<String>>,
}

fn clean_phone(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_phone(&v))
        .filter(|v| !v.is_empty())
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let conn = ctx.db.connect()?;
    let doctors = match query.id {
        Some(id) => repository::get_doctor(&conn, &id)?.into_iter().collect(),
        None => repository::list_doctors(&conn)?,
    };
    Ok(Json(doctors))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = ctx.db.connect()?;
    let doctor = repository::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(Json(doctor))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewDoctor>,
) -> Result<Json<Doctor>, ApiError> {
    auth.require_staff()?;
    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: required(input.name, "name")?,
        clinic_name: input.clinic_name.filter(|c| !c.trim().is_empty()),
        phone_number: clean_phone(input.phone_number),
        status: input.status.filter(|s| !s.trim().is_empty()),
        created_at: Utc::now(),
    };

    let conn = ctx.db.connect()?;
    repository::insert_doctor(&conn, &doctor)?;
    Ok(Json(doctor))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DoctorPatch>,
) -> Result<Json<Doctor>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DoctorQuery>,
    Json(patch): Json<DoctorPatch>,
) -> Result<Json<Doctor>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: DoctorPatch,
) -> Result<Json<Doctor>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut doctor = repository::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;

    if let Some(name) = patch.name {
        doctor.name = required(name, "name")?;
    }
    if let Some(clinic_name) = patch.clinic_name {
        doctor.clinic_name = clinic_name.filter(|c| !c.trim().is_empty());
    }
    if let Some(phone_number) = patch.phone_number {
        doctor.phone_number = clean_phone(phone_number);
    }
    if let Some(status) = patch.status {
        doctor.status = status.filter(|s| !s.trim().is_empty());
    }

    repository::update_doctor(&conn, &doctor)?;
    Ok(Json(doctor))
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
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_doctor(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
