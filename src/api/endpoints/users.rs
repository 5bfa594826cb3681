//! User account endpoints. Mutations are admin-only; responses never carry
//! the stored password hash.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{delete_error, ApiError};
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::hash_password;
use crate::db::repository;
use crate::models::enums::Role;
use crate::models::{User, UserSummary};

use super::{query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

fn role_field(value: &str) -> Result<Role, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("role", "Expected ADMIN, ATTORNEY, or STAFF"))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let conn = ctx.db.connect()?;
    let users = match query.id {
        Some(id) => repository::get_user(&conn, &id)?.into_iter().collect(),
        None => repository::list_users(&conn)?,
    };
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserSummary>, ApiError> {
    let conn = ctx.db.connect()?;
    let user = repository::get_user(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewUser>,
) -> Result<Json<UserSummary>, ApiError> {
    auth.require_admin()?;
    let email = required(input.email, "email")?;
    if input.password.is_empty() {
        return Err(ApiError::validation("password", "Required field is empty"));
    }

    let conn = ctx.db.connect()?;
    if repository::get_user_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::conflict("email", "Email already in use"));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: required(input.name, "name")?,
        email,
        password: hash_password(&input.password)?,
        role: role_field(&input.role)?,
        created_at: Utc::now(),
    };
    repository::insert_user(&conn, &user)?;
    Ok(Json(user.into()))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserSummary>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<UserQuery>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserSummary>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: UserPatch,
) -> Result<Json<UserSummary>, ApiError> {
    auth.require_admin()?;
    let conn = ctx.db.connect()?;
    let mut user = repository::get_user(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if let Some(name) = patch.name {
        user.name = required(name, "name")?;
    }
    if let Some(email) = patch.email {
        let email = required(email, "email")?;
        if email != user.email && repository::get_user_by_email(&conn, &email)?.is_some() {
            return Err(ApiError::conflict("email", "Email already in use"));
        }
        user.email = email;
    }
    if let Some(password) = patch.password {
        if password.is_empty() {
            return Err(ApiError::validation("password", "Required field is empty"));
        }
        user.password = hash_password(&password)?;
    }
    if let Some(role) = patch.role {
        user.role = role_field(&role)?;
    }

    repository::update_user(&conn, &user)?;
    Ok(Json(user.into()))
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
    Query(query): Query<UserQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    auth.require_admin()?;
    if auth.user_id == id {
        return Err(ApiError::Forbidden("Cannot delete your own account".into()));
    }
    let conn = ctx.db.connect()?;
    repository::delete_user(&conn, &id).map_err(delete_error)?;
    Ok(Json(Deleted { deleted: id }))
}
