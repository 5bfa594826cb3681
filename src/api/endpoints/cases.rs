//! Legal case endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Case;

use super::{date_field, id_field, patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct CaseQuery {
    pub id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub patient_id: String,
    pub case_number: String,
    #[serde(default)]
    pub filing_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePatch {
    pub patient_id: Option<String>,
    pub case_number: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub filing_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub status: Option<Option<String>>,
}

fn opt_filing_date(value: Option<String>) -> Result<Option<chrono::NaiveDate>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| date_field(&v, "filingDate"))
        .transpose()
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<CaseQuery>,
) -> Result<Json<Vec<Case>>, ApiError> {
    let conn = ctx.db.connect()?;
    let cases = match query.id {
        Some(id) => repository::get_case(&conn, &id)?.into_iter().collect(),
        None => repository::list_cases(&conn, query.patient_id.as_ref())?,
    };
    Ok(Json(cases))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError> {
    let conn = ctx.db.connect()?;
    let case = repository::get_case(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Case not found".into()))?;
    Ok(Json(case))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewCase>,
) -> Result<Json<Case>, ApiError> {
    auth.require_staff()?;
    let case_number = required(input.case_number, "caseNumber")?;

    let conn = ctx.db.connect()?;
    if repository::get_case_by_number(&conn, &case_number)?.is_some() {
        return Err(ApiError::conflict("caseNumber", "Case number already in use"));
    }

    let case = Case {
        id: Uuid::new_v4(),
        patient_id: id_field(&input.patient_id, "patientId")?,
        case_number,
        filing_date: opt_filing_date(input.filing_date)?,
        status: input.status.filter(|s| !s.trim().is_empty()),
        created_at: Utc::now(),
    };
    repository::insert_case(&conn, &case)?;
    Ok(Json(case))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CasePatch>,
) -> Result<Json<Case>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<CaseQuery>,
    Json(patch): Json<CasePatch>,
) -> Result<Json<Case>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: CasePatch,
) -> Result<Json<Case>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut case = repository::get_case(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Case not found".into()))?;

    if let Some(patient_id) = patch.patient_id {
        case.patient_id = id_field(&patient_id, "patientId")?;
    }
    if let Some(case_number) = patch.case_number {
        let case_number = required(case_number, "caseNumber")?;
        if case_number != case.case_number
            && repository::get_case_by_number(&conn, &case_number)?.is_some()
        {
            return Err(ApiError::conflict("caseNumber", "Case number already in use"));
        }
        case.case_number = case_number;
    }
    if let Some(filing_date) = patch.filing_date {
        case.filing_date = opt_filing_date(filing_date)?;
    }
    if let Some(status) = patch.status {
        case.status = status.filter(|s| !s.trim().is_empty());
    }

    repository::update_case(&conn, &case)?;
    Ok(Json(case))
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
    Query(query): Query<CaseQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_case(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
