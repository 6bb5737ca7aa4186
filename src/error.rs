//! Error types for the conjoint library.
//!
//! Only input validation produces errors. Numeric instability degrades to an
//! efficiency of `0.0` and constraint violations are reported as data, so
//! neither appears here.

use thiserror::Error;

/// The main error type for the conjoint library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============ Grid Validation Errors ============
    /// The grid declares no attributes.
    #[error("Design grid must include at least one attribute")]
    EmptyGrid,

    /// An attribute declares no levels.
    #[error("Attribute '{attribute}' must include at least one level")]
    EmptyAttribute {
        /// Name of the offending attribute.
        attribute: String,
    },

    /// An attribute declares the same level name twice.
    #[error("Duplicate level names in attribute '{attribute}': '{level}'")]
    DuplicateLevel {
        /// Name of the offending attribute.
        attribute: String,
        /// The repeated level name.
        level: String,
    },

    /// Two attributes share a name, so options could not map names to levels.
    #[error("Duplicate attribute name '{0}' in design grid")]
    DuplicateAttribute(String),

    // ============ Request Validation Errors ============
    /// The requested generation method is not known.
    #[error("Unsupported design method: {0}")]
    UnsupportedMethod(String),

    /// A request parameter is out of its valid range.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// Description of what is invalid.
        message: String,
    },

    /// A request parameter exceeds a configured practical limit.
    #[error("{parameter} {value} exceeds the configured maximum of {max}")]
    LimitExceeded {
        /// Name of the limited parameter.
        parameter: &'static str,
        /// Requested value.
        value: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// A specialized `Result` type for conjoint operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }
}
