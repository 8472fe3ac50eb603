//! Error types for homewatt-core.
//!
//! # Error Classification
//!
//! | Error Type | Surfaced as | Retry? |
//! |------------|-------------|--------|
//! | [`Error::Validation`] | client error (HTTP 400) | No, fix the input |
//! | [`Error::UnknownTemplate`] | client error (HTTP 400) | No |
//! | [`Error::NotFound`] | not found (HTTP 404) | No |
//! | [`Error::Conflict`] | conflict (HTTP 409) | No |
//! | [`Error::Persistence`] | server error (HTTP 500) | Left to the caller |
//!
//! The core never retries. A calculation write is all-or-nothing: if the
//! store reports success but returns fewer snapshots than were submitted,
//! the core reports [`Error::Persistence`] rather than a partial result.

use thiserror::Error;

use homewatt_types::ValidationError;

/// Errors produced by the catalog, calculator and store collaborators.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Input violated a data model invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. `device`).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The entity already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A catalog key or device type does not name a known template.
    #[error("Unknown device template: {0}")]
    UnknownTemplate(String),

    /// The backing store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Build a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Build a [`Error::Persistence`] from anything printable.
    pub fn persistence(message: impl ToString) -> Self {
        Error::Persistence(message.to_string())
    }

    /// Whether the caller sent bad input (as opposed to a server-side failure).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Persistence(_))
    }
}

/// Result type alias using homewatt-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_transparent() {
        let err: Error = ValidationError::EmptyDeviceList.into();
        assert_eq!(err.to_string(), "No devices provided");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("device", 42);
        assert_eq!(err.to_string(), "device not found: 42");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_persistence_is_server_error() {
        let err = Error::persistence("disk full");
        assert_eq!(err.to_string(), "Persistence error: disk full");
        assert!(!err.is_client_error());
    }
}
