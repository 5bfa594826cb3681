//! Scheduled procedure endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Procedure;

use super::{date_field, id_field, patch_field, query_id, time_field, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct ProcedureQuery {
    pub id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProcedure {
    pub exam_id: String,
    pub facility_id: String,
    pub physician_id: String,
    pub patient_id: String,
    pub status_id: String,
    pub schedule_date: String,
    pub schedule_time: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub lop: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedurePatch {
    pub exam_id: Option<String>,
    pub facility_id: Option<String>,
    pub physician_id: Option<String>,
    pub patient_id: Option<String>,
    pub status_id: Option<String>,
    pub schedule_date: Option<String>,
    pub schedule_time: Option<String>,
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "patch_field")]
    pub lop: Option<Option<String>>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ProcedureQuery>,
) -> Result<Json<Vec<Procedure>>, ApiError> {
    let conn = ctx.db.connect()?;
    let procedures = match query.id {
        Some(id) => repository::get_procedure(&conn, &id)?.into_iter().collect(),
        None => repository::list_procedures(&conn, query.patient_id.as_ref())?,
    };
    Ok(Json(procedures))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Procedure>, ApiError> {
    let conn = ctx.db.connect()?;
    let procedure = repository::get_procedure(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Procedure not found".into()))?;
    Ok(Json(procedure))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewProcedure>,
) -> Result<Json<Procedure>, ApiError> {
    auth.require_staff()?;
    let procedure = Procedure {
        id: Uuid::new_v4(),
        exam_id: id_field(&input.exam_id, "examId")?,
        facility_id: id_field(&input.facility_id, "facilityId")?,
        physician_id: id_field(&input.physician_id, "physicianId")?,
        patient_id: id_field(&input.patient_id, "patientId")?,
        status_id: id_field(&input.status_id, "statusId")?,
        schedule_date: date_field(&input.schedule_date, "scheduleDate")?,
        schedule_time: time_field(&input.schedule_time, "scheduleTime")?,
        is_completed: input.is_completed,
        lop: input.lop.filter(|s| !s.trim().is_empty()),
        created_at: Utc::now(),
    };
    let conn = ctx.db.connect()?;
    repository::insert_procedure(&conn, &procedure)?;
    Ok(Json(procedure))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProcedurePatch>,
) -> Result<Json<Procedure>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ProcedureQuery>,
    Json(patch): Json<ProcedurePatch>,
) -> Result<Json<Procedure>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: ProcedurePatch,
) -> Result<Json<Procedure>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut procedure = repository::get_procedure(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Procedure not found".into()))?;

    if let Some(exam_id) = patch.exam_id {
        procedure.exam_id = id_field(&exam_id, "examId")?;
    }
    if let Some(facility_id) = patch.facility_id {
        procedure.facility_id = id_field(&facility_id, "facilityId")?;
    }
    if let Some(physician_id) = patch.physician_id {
        procedure.physician_id = id_field(&physician_id, "physicianId")?;
    }
    if let Some(patient_id) = patch.patient_id {
        procedure.patient_id = id_field(&patient_id, "patientId")?;
    }
    if let Some(status_id) = patch.status_id {
        procedure.status_id = id_field(&status_id, "statusId")?;
    }
    if let Some(schedule_date) = patch.schedule_date {
        procedure.schedule_date = date_field(&schedule_date, "scheduleDate")?;
    }
    if let Some(schedule_time) = patch.schedule_time {
        procedure.schedule_time = time_field(&schedule_time, "scheduleTime")?;
    }
    if let Some(is_completed) = patch.is_completed {
        procedure.is_completed = is_completed;
    }
    if let Some(lop) = patch.lop {
        procedure.lop = lop.filter(|s| !s.trim().is_empty());
    }

    repository::update_procedure(&conn, &procedure)?;
    Ok(Json(procedure))
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
    Query(query): Query<ProcedureQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_procedure(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
