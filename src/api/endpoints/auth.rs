//! Identity endpoints: login and current-user lookup.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::{issue_token, verify_password};
use crate::db::repository;
use crate::models::UserSummary;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// `POST /api/auth/login`. Accounts with an empty stored password (no-login
/// attorneys) can never authenticate.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let conn = ctx.db.connect()?;
    let user = repository::get_user_by_email(&conn, input.email.trim())?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&input.password, &user.password) {
        return Err(ApiError::Unauthorized);
    }

    let token = issue_token(&ctx.keys, user.id, user.role)?;
    tracing::info!(user = %user.email, "login");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// `GET /api/auth/me` — the caller's own account.
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserSummary>, ApiError> {
    let conn = ctx.db.connect()?;
    let user = repository::get_user(&conn, &auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}
