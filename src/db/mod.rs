pub mod repository;
pub mod sqlite;

pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Unique value already in use: {column}")]
    Conflict { column: String },

    #[error("Referenced row does not exist or is still referenced")]
    ForeignKey,
}

/// Classify constraint failures so handlers can answer 409/400 instead of 500.
impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, ref message) = err {
            match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::Conflict {
                        column: unique_column(message.as_deref()),
                    };
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKey,
                _ => {}
            }
        }
        Self::Sqlite(err)
    }
}

/// SQLite reports unique violations as "UNIQUE constraint failed: users.email";
/// keep the `table.column` tail for the conflict message.
fn unique_column(message: Option<&str>) -> String {
    message
        .and_then(|m| m.rsplit(": ").next())
        .unwrap_or("value")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_classified_as_conflict() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO payers (id, name, is_active, created_at) VALUES ('p1', 'BCBS', 1, '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let err: DatabaseError = conn
            .execute(
                "INSERT INTO payers (id, name, is_active, created_at) VALUES ('p2', 'BCBS', 1, '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap_err()
            .into();
        match err {
            DatabaseError::Conflict { column } => assert_eq!(column, "payers.name"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn fk_violation_classified() {
        let conn = open_memory_database().unwrap();
        let err: DatabaseError = conn
            .execute(
                "INSERT INTO case_managers (id, attorney_id, name, created_at)
                 VALUES ('cm1', 'no-such-attorney', 'CM', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap_err()
            .into();
        assert!(matches!(err, DatabaseError::ForeignKey));
    }

    #[test]
    fn other_errors_pass_through() {
        let conn = open_memory_database().unwrap();
        let err: DatabaseError = conn
            .execute("INSERT INTO no_such_table (id) VALUES (1)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, DatabaseError::Sqlite(_)));
    }
}
