//! Validation Error Types

use thiserror::Error;

/// Errors during input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Present value that does not parse as a number
    #[error("{field}: numeric expected, got {value}")]
    NotNumeric { field: &'static str, value: String },

    /// Numeric value that is NaN or infinite
    #[error("{field}: value must be finite")]
    NonFinite { field: &'static str },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
