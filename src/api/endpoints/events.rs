//! Audit event endpoints. The trail is append-only: rows are written by the
//! audit middleware, and this surface is read-only.

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::Event;

use super::{Path, Query};

#[derive(Debug, Default, serde::Deserialize)]
pub struct EventQuery {
    pub id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let conn = ctx.db.connect()?;
    let events = match query.id {
        Some(id) => repository::get_event(&conn, &id)?.into_iter().collect(),
        None => repository::list_events(&conn, query.patient_id.as_ref())?,
    };
    Ok(Json(events))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let conn = ctx.db.connect()?;
    let event = repository::get_event(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}
