//! Exam catalog endpoints.
//!
//! An exam can be created together with its priced sub-exams; the pair is
//! written in one transaction and deleted together.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::{Exam, SubExam};

use super::{patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct ExamQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExam {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sub_exams: Vec<NewSubExamInline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubExamInline {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub status: Option<Option<String>>,
}

/// Exam with its sub-exams, returned by `GET /{id}` and `POST`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDetail {
    #[serde(flatten)]
    pub exam: Exam,
    pub sub_exams: Vec<SubExam>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ExamQuery>,
) -> Result<Json<Vec<Exam>>, ApiError> {
    let conn = ctx.db.connect()?;
    let exams = match query.id {
        Some(id) => repository::get_exam(&conn, &id)?.into_iter().collect(),
        None => repository::list_exams(&conn)?,
    };
    Ok(Json(exams))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamDetail>, ApiError> {
    let conn = ctx.db.connect()?;
    let exam = repository::get_exam(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Exam not found".into()))?;
    let sub_exams = repository::list_sub_exams(&conn, Some(&id))?;
    Ok(Json(ExamDetail { exam, sub_exams }))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewExam>,
) -> Result<Json<ExamDetail>, ApiError> {
    auth.require_staff()?;
    let exam = Exam {
        id: Uuid::new_v4(),
        name: required(input.name, "name")?,
        category: input.category.filter(|s| !s.trim().is_empty()),
        status: input.status.filter(|s| !s.trim().is_empty()),
        created_at: Utc::now(),
    };
    let mut sub_exams = Vec::with_capacity(input.sub_exams.len());
    for sub in input.sub_exams {
        sub_exams.push(SubExam {
            id: Uuid::new_v4(),
            exam_id: exam.id,
            name: required(sub.name, "subExams.name")?,
            price: sub.price,
            created_at: Utc::now(),
        });
    }

    let mut conn = ctx.db.connect()?;
    repository::create_exam_with_sub_exams(&mut conn, &exam, &sub_exams)?;
    Ok(Json(ExamDetail { exam, sub_exams }))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ExamPatch>,
) -> Result<Json<Exam>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExamQuery>,
    Json(patch): Json<ExamPatch>,
) -> Result<Json<Exam>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: ExamPatch,
) -> Result<Json<Exam>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut exam = repository::get_exam(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Exam not found".into()))?;

    if let Some(name) = patch.name {
        exam.name = required(name, "name")?;
    }
    if let Some(category) = patch.category {
        exam.category = category.filter(|s| !s.trim().is_empty());
    }
    if let Some(status) = patch.status {
        exam.status = status.filter(|s| !s.trim().is_empty());
    }

    repository::update_exam(&conn, &exam)?;
    Ok(Json(exam))
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
    Query(query): Query<ExamQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_exam(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
