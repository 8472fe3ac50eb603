//! Validation errors for homewatt input data.

use thiserror::Error;

/// Errors raised when user-supplied data violates the data model invariants.
///
/// These are always client errors: the caller sent something malformed and
/// retrying the same input will fail the same way.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A calculation was requested without any devices.
    #[error("No devices provided")]
    EmptyDeviceList,

    /// A required text field was empty.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Power draw is negative, zero where forbidden, or not a number.
    #[error("Invalid wattage {0}: must be a finite positive number")]
    InvalidWatts(f64),

    /// Daily usage is outside 0-24 hours.
    #[error("Invalid hours per day {0}: must be between 0 and 24")]
    HoursOutOfRange(f64),

    /// Weekly usage is outside 1-7 days.
    #[error("Invalid days per week {0}: must be between 1 and 7")]
    DaysOutOfRange(u8),

    /// The computed or supplied total is not a finite positive number.
    #[error("Invalid total consumption value {0}")]
    InvalidTotal(f64),

    /// A client-supplied total disagrees with the server-side computation.
    #[error("Total consumption {supplied} does not match computed value {computed}")]
    TotalMismatch {
        /// Total sent by the client.
        supplied: f64,
        /// Total computed from the device list.
        computed: f64,
    },

    /// Electricity rate is negative or not a number.
    #[error("Invalid electricity rate {0}: must be a finite non-negative number")]
    InvalidRate(f64),

    /// Wattage filter bounds are inverted or negative.
    #[error("Invalid wattage range: min {min} is greater than max {max}")]
    InvalidWattRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Sort key is not one of the supported device columns.
    #[error("Unknown sort key '{0}'")]
    UnknownSortKey(String),

    /// Ordering direction is not one of the accepted names.
    #[error("Unknown order '{value}': expected {expected}")]
    UnknownOrder {
        /// Value that was sent.
        value: String,
        /// Accepted names.
        expected: &'static str,
    },

    /// Category value does not name a built-in category.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
}

/// Result type alias using [`ValidationError`].
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
