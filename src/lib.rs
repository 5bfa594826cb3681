//! medintake — medical-legal intake and scheduling server.
//!
//! Patients, attorneys and their case managers, referring doctors,
//! performing physicians, facilities, exams and procedures, payers,
//! statuses, staff tasks, and an audit event trail, exposed as a role-gated
//! CRUD API over SQLite.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod format;
pub mod models;
