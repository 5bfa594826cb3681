//! Endpoint handlers, one module per resource.
//!
//! Every resource follows the same contract: `GET` collection (optionally
//! narrowed by `?id=` or a sub-resource filter), `GET /{id}`, `POST`,
//! `PUT /{id}` with merge semantics, `DELETE /{id}`. `PUT` and `DELETE`
//! also accept `?id=` in place of the path segment.

pub mod appointments;
pub mod attorneys;
pub mod auth;
pub mod case_managers;
pub mod cases;
pub mod doctors;
pub mod events;
pub mod exams;
pub mod facilities;
pub mod health;
pub mod patients;
pub mod payers;
pub mod physicians;
pub mod procedures;
pub mod statuses;
pub mod sub_exams;
pub mod tasks;
pub mod users;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::format;

/// Response body for every DELETE.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: Uuid,
}

/// `axum::extract::Query` with its rejection mapped into the structured
/// error body, so `?id=not-a-uuid` answers like every other validation
/// failure instead of a bare-text 400.
#[derive(Debug)]
pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Query(value)),
            Err(_) => Err(ApiError::validation("query", "Invalid query parameter")),
        }
    }
}

/// `axum::extract::Path` with the same structured rejection for a path id
/// that is not a UUID.
#[derive(Debug)]
pub struct Path<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(_) => Err(ApiError::validation("id", "Invalid id")),
        }
    }
}

/// Distinguishes an absent update field (keep the current value) from an
/// explicit `null` (clear it). Use with `#[serde(default)]`.
pub(crate) fn patch_field<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

pub(crate) fn default_true() -> bool {
    true
}

/// Trimmed, non-empty string or a field-level validation error.
pub(crate) fn required(value: String, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(field, "Required field is empty"));
    }
    Ok(trimmed.to_string())
}

/// Parse an id submitted as a JSON string field.
pub(crate) fn id_field(value: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::validation(field, "Invalid id"))
}

/// Parse a date submitted as `MM/DD/YYYY` or `YYYY-MM-DD`.
pub(crate) fn date_field(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    format::parse_date(value).ok_or_else(|| ApiError::validation(field, "Invalid date"))
}

/// Parse a time submitted as 24-hour `HH:MM` or `HH:MM AM/PM`.
pub(crate) fn time_field(value: &str, field: &str) -> Result<String, ApiError> {
    format::parse_time(value).ok_or_else(|| ApiError::validation(field, "Invalid time"))
}

/// The id for `PUT`/`DELETE` sent as `?id=` instead of a path segment.
pub(crate) fn query_id(id: Option<Uuid>) -> Result<Uuid, ApiError> {
    id.ok_or_else(|| ApiError::validation("id", "Missing id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_empty() {
        assert_eq!(required("  Ana ".into(), "firstName").unwrap(), "Ana");
        assert!(required("   ".into(), "firstName").is_err());
    }

    #[test]
    fn id_field_rejects_garbage() {
        let id = Uuid::new_v4();
        assert_eq!(id_field(&id.to_string(), "payerId").unwrap(), id);
        assert!(id_field("not-an-id", "payerId").is_err());
    }

    #[test]
    fn date_field_accepts_both_forms() {
        assert!(date_field("03/12/1985", "dateOfBirth").is_ok());
        assert!(date_field("1985-03-12", "dateOfBirth").is_ok());
        assert!(date_field("02/30/2024", "dateOfBirth").is_err());
    }
}
