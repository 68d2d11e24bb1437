//! # Error Types
//!
//! Structured error types for cable_core. Every variant carries enough context
//! to point the caller at the offending field, table, or artifact.
//!
//! "No standard section satisfies the constraints" is deliberately absent here:
//! it is a normal outcome, reported as
//! [`SizingResult::NoCompliantSection`](crate::calculations::SizingResult).
//!
//! ## Example
//!
//! ```rust
//! use cable_core::errors::{CalcError, CalcResult};
//!
//! fn validate_length(length_m: f64) -> CalcResult<()> {
//!     if length_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "cable_length_m",
//!             length_m.to_string(),
//!             "Cable length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_length(-5.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for cable_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for sizing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-positive, not finite, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A lookup key is absent from the reference tables
    #[error("Configuration error for '{field}': '{key}' is not in the {table} table")]
    ConfigurationError {
        field: String,
        table: String,
        key: String,
    },

    /// A reference table is malformed (unsorted, empty, out-of-range factor, ...)
    #[error("Invalid reference data in {table}: {reason}")]
    InvalidReferenceData { table: String, reason: String },

    /// A report artifact or document failed to render
    #[error("Render failed: {artifact} - {reason}")]
    RenderFailed { artifact: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigurationError
    pub fn configuration_error(field: impl Into<String>, table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::ConfigurationError {
            field: field.into(),
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create an InvalidReferenceData error
    pub fn invalid_reference_data(table: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidReferenceData {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create a RenderFailed error
    pub fn render_failed(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::RenderFailed {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Field name of the offending input, when the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidInput { field, .. } | CalcError::ConfigurationError { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            CalcError::InvalidReferenceData { .. } => "INVALID_REFERENCE_DATA",
            CalcError::RenderFailed { .. } => "RENDER_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::configuration_error("installation_method", "installation factor", "Z");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"ConfigurationError\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalcError::invalid_input("design_current_a", "0", "must be positive").error_code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            CalcError::configuration_error("ambient_temperature_c", "temperature factor", "33").error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(CalcError::render_failed("chart", "empty").error_code(), "RENDER_FAILED");
        assert_eq!(
            CalcError::invalid_reference_data("ampacity", "table is empty").error_code(),
            "INVALID_REFERENCE_DATA"
        );
        assert_eq!(CalcError::file_error("read", "t.toml", "missing").error_code(), "FILE_ERROR");
        assert_eq!(
            CalcError::SerializationError { reason: "bad".to_string() }.error_code(),
            "SERIALIZATION_ERROR"
        );
    }

    #[test]
    fn test_error_field_context() {
        let error = CalcError::configuration_error("ambient_temperature_c", "temperature factor", "33");
        assert_eq!(error.field(), Some("ambient_temperature_c"));
        assert!(error.to_string().contains("'33'"));
        assert_eq!(CalcError::render_failed("chart", "empty").field(), None);
    }
}
