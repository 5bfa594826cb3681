//! HTTP JSON API.
//!
//! One resource path per entity under `/api/`, protected by a middleware
//! stack: Auth → Audit → Handler. `POST /api/auth/login` and
//! `GET /api/health` are the only unprotected routes.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{serve, ServerHandle};
pub use types::ApiContext;
