//! Shared types for the API layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::TokenKeys;
use crate::db::Database;
use crate::models::enums::Role;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Database,
    pub keys: Arc<TokenKeys>,
}

impl ApiContext {
    pub fn new(db: Database, keys: TokenKeys) -> Self {
        Self {
            db,
            keys: Arc::new(keys),
        }
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin-only operations (user management).
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin role required".into()))
        }
    }

    /// Back-office mutations: admins and staff, never attorneys.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Admin | Role::Staff => Ok(()),
            Role::Attorney => Err(ApiError::Forbidden("Staff role required".into())),
        }
    }

    /// Owned-resource mutations: the owning user or an admin.
    pub fn require_owner(&self, owner_user_id: Uuid) -> Result<(), ApiError> {
        if self.is_admin() || self.user_id == owner_user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Not the owner of this record".into()))
        }
    }
}
