//! Patient endpoints.
//!
//! Dates arrive in the `MM/DD/YYYY` form mask or ISO form and are stored as
//! true calendar dates; phones are stored as bare digit strings.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::format::normalize_phone;
use crate::models::Patient;

use super::{date_field, id_field, patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct PatientQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub payer_id: String,
    pub status_id: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub doidol: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub attorney_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub payer_id: Option<String>,
    pub status_id: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub date_of_birth: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub doidol: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub attorney_id: Option<Option<String>>,
}

fn clean_phone(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_phone(&v))
        .filter(|v| !v.is_empty())
}

fn opt_date(
    value: Option<String>,
    field: &str,
) -> Result<Option<chrono::NaiveDate>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| date_field(&v, field))
        .transpose()
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.db.connect()?;
    let patients = match query.id {
        Some(id) => repository::get_patient(&conn, &id)?.into_iter().collect(),
        None => repository::list_patients(&conn)?,
    };
    Ok(Json(patients))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.db.connect()?;
    let patient = repository::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    Ok(Json(patient))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    auth.require_staff()?;
    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: required(input.first_name, "firstName")?,
        last_name: required(input.last_name, "lastName")?,
        date_of_birth: opt_date(input.date_of_birth, "dateOfBirth")?,
        doidol: opt_date(input.doidol, "doidol")?,
        gender: input.gender.filter(|s| !s.trim().is_empty()),
        phone: clean_phone(input.phone),
        address: input.address.filter(|s| !s.trim().is_empty()),
        payer_id: id_field(&input.payer_id, "payerId")?,
        status_id: id_field(&input.status_id, "statusId")?,
        attorney_id: input
            .attorney_id
            .filter(|v| !v.trim().is_empty())
            .map(|v| id_field(&v, "attorneyId"))
            .transpose()?,
        created_at: Utc::now(),
    };
    let conn = ctx.db.connect()?;
    repository::insert_patient(&conn, &patient)?;
    Ok(Json(patient))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PatientPatch>,
) -> Result<Json<Patient>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PatientQuery>,
    Json(patch): Json<PatientPatch>,
) -> Result<Json<Patient>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: PatientPatch,
) -> Result<Json<Patient>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut patient = repository::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;

    if let Some(first_name) = patch.first_name {
        patient.first_name = required(first_name, "firstName")?;
    }
    if let Some(last_name) = patch.last_name {
        patient.last_name = required(last_name, "lastName")?;
    }
    if let Some(payer_id) = patch.payer_id {
        patient.payer_id = id_field(&payer_id, "payerId")?;
    }
    if let Some(status_id) = patch.status_id {
        patient.status_id = id_field(&status_id, "statusId")?;
    }
    if let Some(date_of_birth) = patch.date_of_birth {
        patient.date_of_birth = opt_date(date_of_birth, "dateOfBirth")?;
    }
    if let Some(doidol) = patch.doidol {
        patient.doidol = opt_date(doidol, "doidol")?;
    }
    if let Some(gender) = patch.gender {
        patient.gender = gender.filter(|s| !s.trim().is_empty());
    }
    if let Some(phone) = patch.phone {
        patient.phone = clean_phone(phone);
    }
    if let Some(address) = patch.address {
        patient.address = address.filter(|s| !s.trim().is_empty());
    }
    if let Some(attorney_id) = patch.attorney_id {
        patient.attorney_id = attorney_id
            .filter(|v| !v.trim().is_empty())
            .map(|v| id_field(&v, "attorneyId"))
            .transpose()?;
    }

    repository::update_patient(&conn, &patient)?;
    Ok(Json(patient))
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
    Query(query): Query<PatientQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_patient(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
