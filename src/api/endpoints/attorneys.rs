//! Attorney endpoints.
//!
//! An attorney is a composite record: the profile row, a linked user account
//! (role ATTORNEY), and any case managers. Creation and deletion move the
//! whole graph in one transaction; a `password` on update rehashes the
//! linked user's credential in the same transaction as the profile change.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::hash_password;
use crate::db::repository;
use crate::format::normalize_phone;
use crate::models::enums::Role;
use crate::models::{Attorney, AttorneyProfile, CaseManager, User, UserSummary};

use super::{patch_field, query_id, required, Deleted, Path, Query};

#[derive(Debug, Default, Deserialize)]
pub struct AttorneyQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttorney {
    pub name: String,
    pub email: String,
    /// When false (the default), the linked user gets an empty password and
    /// can never log in.
    #[serde(default)]
    pub has_login: bool,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bar_number: Option<String>,
    #[serde(default)]
    pub case_managers: Vec<NewCaseManagerInline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaseManagerInline {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttorneyPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub zip: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub bar_number: Option<Option<String>>,
}

fn clean_phone(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_phone(&v))
        .filter(|v| !v.is_empty())
}

fn clean(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<AttorneyQuery>,
) -> Result<Json<Vec<AttorneyProfile>>, ApiError> {
    let conn = ctx.db.connect()?;
    let profiles = match query.id {
        Some(id) => repository::get_attorney_profile(&conn, &id)?.into_iter().collect(),
        None => repository::list_attorney_profiles(&conn)?,
    };
    Ok(Json(profiles))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttorneyProfile>, ApiError> {
    let conn = ctx.db.connect()?;
    let profile = repository::get_attorney_profile(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Attorney not found".into()))?;
    Ok(Json(profile))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(input): Json<NewAttorney>,
) -> Result<Json<AttorneyProfile>, ApiError> {
    auth.require_staff()?;
    let name = required(input.name, "name")?;
    let email = required(input.email, "email")?;

    let password = if input.has_login {
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::validation("password", "Required when hasLogin is set"))?;
        hash_password(&password)?
    } else {
        String::new()
    };

    let mut conn = ctx.db.connect()?;
    if repository::get_user_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::conflict("email", "Email already in use"));
    }

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password,
        role: Role::Attorney,
        created_at: Utc::now(),
    };
    let attorney = Attorney {
        id: Uuid::new_v4(),
        user_id: user.id,
        address: clean(input.address),
        city: clean(input.city),
        state: clean(input.state),
        zip: clean(input.zip),
        phone: clean_phone(input.phone),
        bar_number: clean(input.bar_number),
        created_at: Utc::now(),
    };
    let mut case_managers = Vec::with_capacity(input.case_managers.len());
    for cm in input.case_managers {
        case_managers.push(CaseManager {
            id: Uuid::new_v4(),
            attorney_id: attorney.id,
            name: required(cm.name, "caseManagers.name")?,
            email: clean(cm.email),
            phone: clean_phone(cm.phone),
            created_at: Utc::now(),
        });
    }

    repository::create_attorney_with_user(&mut conn, &user, &attorney, &case_managers)?;
    Ok(Json(AttorneyProfile {
        attorney,
        user: UserSummary::from(user),
        case_managers,
    }))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AttorneyPatch>,
) -> Result<Json<AttorneyProfile>, ApiError> {
    apply_update(&ctx, auth, id, patch)
}

pub async fn update_by_query(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AttorneyQuery>,
    Json(patch): Json<AttorneyPatch>,
) -> Result<Json<AttorneyProfile>, ApiError> {
    apply_update(&ctx, auth, query_id(query.id)?, patch)
}

fn apply_update(
    ctx: &ApiContext,
    auth: AuthContext,
    id: Uuid,
    patch: AttorneyPatch,
) -> Result<Json<AttorneyProfile>, ApiError> {
    let mut conn = ctx.db.connect()?;
    let mut attorney = repository::get_attorney(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Attorney not found".into()))?;
    auth.require_owner(attorney.user_id)?;
    let mut user = repository::get_user(&conn, &attorney.user_id)?
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
    if let Some(address) = patch.address {
        attorney.address = address.filter(|s| !s.trim().is_empty());
    }
    if let Some(city) = patch.city {
        attorney.city = city.filter(|s| !s.trim().is_empty());
    }
    if let Some(state) = patch.state {
        attorney.state = state.filter(|s| !s.trim().is_empty());
    }
    if let Some(zip) = patch.zip {
        attorney.zip = zip.filter(|s| !s.trim().is_empty());
    }
    if let Some(phone) = patch.phone {
        attorney.phone = clean_phone(phone);
    }
    if let Some(bar_number) = patch.bar_number {
        attorney.bar_number = bar_number.filter(|s| !s.trim().is_empty());
    }

    repository::update_attorney_with_user(&mut conn, &attorney, &user)?;
    let case_managers = repository::list_case_managers(&conn, Some(&id))?;
    Ok(Json(AttorneyProfile {
        attorney,
        user: UserSummary::from(user),
        case_managers,
    }))
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
    Query(query): Query<AttorneyQuery>,
) -> Result<Json<Deleted>, ApiError> {
    apply_remove(&ctx, auth, query_id(query.id)?)
}

fn apply_remove(ctx: &ApiContext, auth: AuthContext, id: Uuid) -> Result<Json<Deleted>, ApiError> {
    let mut conn = ctx.db.connect()?;
    let attorney = repository::get_attorney(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Attorney not found".into()))?;
    auth.require_owner(attorney.user_id)?;
    repository::delete_attorney_cascade(&mut conn, &id)?;
    Ok(Json(Deleted { deleted: id }))
}
