//! Sub-exam endpoints (priced variants of a catalog exam).

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::SubExam;

use super::{id_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct SubExamQuery {
    pub id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubExam {
    pub exam_id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubExamPatch {
    pub exam_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<SubExamQuery>,
) -> Result<Json<Vec<SubExam>>, ApiError> {
    let conn = ctx.db.connect()?;
    let sub_exams = match query.id {
        Some(id) => repository::get_sub_exam(&conn, &id)?.into_iter().collect(),
        None => repository::list_sub_exams(&conn, query.exam_id.as_ref())?,
    };
    Ok(Json(sub_exams))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubExam>, ApiError> {
    let conn = ctx.db.connect()?;
    let sub_exam = repository::get_sub_exam(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Sub-exam not found".into()))?;
    Ok(Json(sub_exam))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewSubExam>,
) -> Result<Json<SubExam>, ApiError> {
    auth.require_staff()?;
    let sub_exam = SubExam {
        id: Uuid::new_v4(),
        exam_id: id_field(&input.exam_id, "examId")?,
        name: required(input.name, "name")?,
        price: input.price,
        created_at: Utc::now(),
    };
    let conn = ctx.db.connect()?;
    repository::insert_sub_exam(&conn, &sub_exam)?;
    Ok(Json(sub_exam))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SubExamPatch>,
) -> Result<Json<SubExam>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SubExamQuery>,
    Json(patch): Json<SubExamPatch>,
) -> Result<Json<SubExam>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: SubExamPatch,
) -> Result<Json<SubExam>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut sub_exam = repository::get_sub_exam(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Sub-exam not found".into()))?;

    if let Some(exam_id) = patch.exam_id {
        sub_exam.exam_id = id_field(&exam_id, "examId")?;
    }
    if let Some(name) = patch.name {
        sub_exam.name = required(name, "name")?;
    }
    if let Some(price) = patch.price {
        sub_exam.price = price;
    }

    repository::update_sub_exam(&conn, &sub_exam)?;
    Ok(Json(sub_exam))
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
    Query(query): Query<SubExamQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_sub_exam(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
