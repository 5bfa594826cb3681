//! Audit trail middleware.
//!
//! Records every successful mutating request (POST/PUT/DELETE) as an Event
//! row after the response is produced. Runs innermost, after auth has
//! injected `AuthContext`.

use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::api::types::{ApiContext, AuthContext};
use crate::db::repository::insert_event;
use crate::models::Event;

pub async fn record_mutations(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let ctx = req.extensions().get::<ApiContext>().cloned();
    let auth = req.extensions().get::<AuthContext>().copied();

    let response = next.run(req).await;

    let mutating = method == Method::POST || method == Method::PUT || method == Method::DELETE;
    if !mutating {
        return response;
    }
    if !response.status().is_success() {
        return response;
    }
    let Some(ctx) = ctx else {
        return response;
    };

    // A deleted patient cannot be referenced anymore, so DELETE events are
    // recorded without the patient scope.
    let patient_id = if method == Method::DELETE {
        None
    } else {
        patient_scope(&path, query.as_deref())
    };

    let event = Event {
        id: Uuid::new_v4(),
        action: format!("{method} {path}"),
        detail: Some(format!("status:{}", response.status().as_u16())),
        user_id: auth.map(|a| a.user_id),
        patient_id,
        created_at: Utc::now(),
    };

    if let Err(e) = ctx.db.connect().and_then(|conn| insert_event(&conn, &event)) {
        tracing::warn!("audit event not recorded: {e}");
    }

    response
}

/// Requests addressing a patient are scoped to it, whether the id comes as
/// `/api/patients/{id}` or as `/api/patients?id=...`.
fn patient_scope(path: &str, query: Option<&str>) -> Option<Uuid> {
    if let Some(rest) = path.strip_prefix("/api/patients/") {
        return rest
            .split('/')
            .next()
            .and_then(|id| Uuid::parse_str(id).ok());
    }
    if path == "/api/patients" {
        return query?
            .split('&')
            .find_map(|pair| pair.strip_prefix("id="))
            .and_then(|id| Uuid::parse_str(id).ok());
    }
    None
}
