//! Authentication: password hashing and signed session tokens.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token, Claims, TokenKeys};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Token rejected")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error("Token encoding failed: {0}")]
    TokenEncoding(String),
}
