//! Error types for homewatt-store.

use std::path::PathBuf;

use homewatt_types::ValidationError;

/// Result type for homewatt-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in homewatt-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input rejected before reaching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Device not found in database.
    #[error("Device not found: {0}")]
    DeviceNotFound(i64),

    /// A category with this value already exists.
    #[error("Category already exists: {0}")]
    CategoryExists(String),

    /// A calculation was written without all of its devices.
    #[error("Incomplete calculation {id}: stored {stored} of {expected} devices")]
    IncompleteCalculation {
        id: i64,
        stored: usize,
        expected: usize,
    },

    /// Invalid timestamp.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Error> for homewatt_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(e) => homewatt_core::Error::Validation(e),
            Error::DeviceNotFound(id) => homewatt_core::Error::not_found("device", id),
            Error::CategoryExists(value) => {
                homewatt_core::Error::Conflict(format!("category '{value}' already exists"))
            }
            other => homewatt_core::Error::persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_maps_to_not_found() {
        let err: homewatt_core::Error = Error::DeviceNotFound(7).into();
        assert!(matches!(
            err,
            homewatt_core::Error::NotFound { entity: "device", .. }
        ));
    }

    #[test]
    fn test_database_error_maps_to_persistence() {
        let err: homewatt_core::Error =
            Error::Database(rusqlite::Error::QueryReturnedNoRows).into();
        assert!(matches!(err, homewatt_core::Error::Persistence(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_category_exists_maps_to_conflict() {
        let err: homewatt_core::Error = Error::CategoryExists("kitchen".into()).into();
        assert!(matches!(err, homewatt_core::Error::Conflict(_)));
    }
}
