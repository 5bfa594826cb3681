//! Request middleware: authentication and audit trail.

pub mod audit;
pub mod auth;
