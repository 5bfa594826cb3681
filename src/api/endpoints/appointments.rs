//! Appointment endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Appointment;

use super::{date_field, id_field, patch_field, query_id, time_field, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    pub id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_id: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub exam_id: Option<String>,
    #[serde(default, rename = "type")]
    pub appointment_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    pub patient_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub doctor_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub exam_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field", rename = "type")]
    pub appointment_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub notes: Option<Option<String>>,
}

fn opt_id(value: Option<String>, field: &str) -> Result<Option<Uuid>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| id_field(&v, field))
        .transpose()
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let conn = ctx.db.connect()?;
    let appointments = match query.id {
        Some(id) => repository::get_appointment(&conn, &id)?.into_iter().collect(),
        None => repository::list_appointments(&conn, query.patient_id.as_ref())?,
    };
    Ok(Json(appointments))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.db.connect()?;
    let appointment = repository::get_appointment(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;
    Ok(Json(appointment))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewAppointment>,
) -> Result<Json<Appointment>, ApiError> {
    auth.require_staff()?;
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: id_field(&input.patient_id, "patientId")?,
        doctor_id: opt_id(input.doctor_id, "doctorId")?,
        exam_id: opt_id(input.exam_id, "examId")?,
        date: date_field(&input.date, "date")?,
        time: time_field(&input.time, "time")?,
        appointment_type: input.appointment_type.filter(|s| !s.trim().is_empty()),
        status: input.status.filter(|s| !s.trim().is_empty()),
        notes: input.notes.filter(|s| !s.trim().is_empty()),
        created_at: Utc::now(),
    };
    let conn = ctx.db.connect()?;
    repository::insert_appointment(&conn, &appointment)?;
    Ok(Json(appointment))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AppointmentPatch>,
) -> Result<Json<Appointment>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AppointmentQuery>,
    Json(patch): Json<AppointmentPatch>,
) -> Result<Json<Appointment>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: AppointmentPatch,
) -> Result<Json<Appointment>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut appointment = repository::get_appointment(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".into()))?;

    if let Some(patient_id) = patch.patient_id {
        appointment.patient_id = id_field(&patient_id, "patientId")?;
    }
    if let Some(date) = patch.date {
        appointment.date = date_field(&date, "date")?;
    }
    if let Some(time) = patch.time {
        appointment.time = time_field(&time, "time")?;
    }
    if let Some(doctor_id) = patch.doctor_id {
        appointment.doctor_id = opt_id(doctor_id, "doctorId")?;
    }
    if let Some(exam_id) = patch.exam_id {
        appointment.exam_id = opt_id(exam_id, "examId")?;
    }
    if let Some(appointment_type) = patch.appointment_type {
        appointment.appointment_type = appointment_type.filter(|s| !s.trim().is_empty());
    }
    if let Some(status) = patch.status {
        appointment.status = status.filter(|s| !s.trim().is_empty());
    }
    if let Some(notes) = patch.notes {
        appointment.notes = notes.filter(|s| !s.trim().is_empty());
    }

    repository::update_appointment(&conn, &appointment)?;
    Ok(Json(appointment))
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
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_appointment(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
