//! Payer endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository;
use crate::models::Payer;

use super::{default_true, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct PayerQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayer {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<PayerQuery>,
) -> Result<Json<Vec<Payer>>, ApiError> {
    let conn = ctx.db.connect()?;
    let payers = match query.id {
        Some(id) => repository::get_payer(&conn, &id)?.into_iter().collect(),
        None => repository::list_payers(&conn)?,
    };
    Ok(Json(payers))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payer>, ApiError> {
    let conn = ctx.db.connect()?;
    let payer = repository::get_payer(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Payer not found".into()))?;
    Ok(Json(payer))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewPayer>,
) -> Result<Json<Payer>, ApiError> {
    auth.require_staff()?;
    let name = required(input.name, "name")?;

    let conn = ctx.db.connect()?;
    if repository::get_payer_by_name(&conn, &name)?.is_some() {
        return Err(ApiError::conflict("name", "Payer name already in use"));
    }

    let payer = Payer {
        id: Uuid::new_v4(),
        name,
        is_active: input.is_active,
        created_at: Utc::now(),
    };
    repository::insert_payer(&conn, &payer)?;
    Ok(Json(payer))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PayerPatch>,
) -> Result<Json<Payer>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PayerQuery>,
    Json(patch): Json<PayerPatch>,
) -> Result<Json<Payer>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: PayerPatch,
) -> Result<Json<Payer>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    let mut payer = repository::get_payer(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Payer not found".into()))?;

    if let Some(name) = patch.name {
        let name = required(name, "name")?;
        if name != payer.name && repository::get_payer_by_name(&conn, &name)?.is_some() {
            return Err(ApiError::conflict("name", "Payer name already in use"));
        }
        payer.name = name;
    }
    if let Some(is_active) = patch.is_active {
        payer.is_active = is_active;
    }

    repository::update_payer(&conn, &payer)?;
    Ok(Json(payer))
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
    Query(query): Query<PayerQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_staff()?;
    let conn = ctx.db.connect()?;
    repository::delete_payer(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
