//! # Error Types
//!
//! Structured error types for solar_core. Validation failures carry every
//! offending field so a form can highlight all of them in one pass.
//!
//! ## Example
//!
//! ```rust
//! use solar_core::errors::{CalcError, CalcResult, FieldError};
//!
//! fn validate_hours(hours: f64) -> CalcResult<()> {
//!     if !(hours > 0.0) {
//!         return Err(CalcError::validation(vec![FieldError::new(
//!             "backup_hours",
//!             hours.to_string(),
//!             "Backup hours must be a positive number",
//!         )]));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_hours(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for solar_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// A single rejected input field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    /// Field name as it appears in the serialized input
    pub field: String,
    /// Offending value, rendered as text
    pub value: String,
    /// Human-readable reason
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' = {} ({})", self.field, self.value, self.reason)
    }
}

/// Structured error type for sizing, selection and rendering operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// One or more sizing inputs failed validation
    #[error("Invalid inputs: {}", join_field_errors(.errors))]
    Validation { errors: Vec<FieldError> },

    /// A single non-engine input is invalid (device entry, list index, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The inverter catalog has no usable entries
    #[error("Catalog '{catalog}' has no usable entries")]
    EmptyCatalog { catalog: String },

    /// Configuration could not be parsed or failed validation
    #[error("Configuration error in {source_name}: {reason}")]
    ConfigError { source_name: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Typst compilation or PDF export failed
    #[error("Render error during {stage}: {reason}")]
    RenderError { stage: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CalcError {
    /// Create a Validation error from the collected field errors
    pub fn validation(errors: Vec<FieldError>) -> Self {
        CalcError::Validation { errors }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an EmptyCatalog error
    pub fn empty_catalog(catalog: impl Into<String>) -> Self {
        CalcError::EmptyCatalog {
            catalog: catalog.into(),
        }
    }

    /// Create a ConfigError
    pub fn config_error(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            source_name: source_name.into(),
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

    /// Create a RenderError
    pub fn render_error(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::RenderError {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Names of the fields rejected by a Validation error (empty otherwise)
    pub fn failed_fields(&self) -> Vec<&str> {
        match self {
            CalcError::Validation { errors } => errors.iter().map(|e| e.field.as_str()).collect(),
            CalcError::InvalidInput { field, .. } => vec![field.as_str()],
            _ => Vec::new(),
        }
    }

    /// Whether the user can fix the problem by correcting their input
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            CalcError::Validation { .. } | CalcError::InvalidInput { .. } | CalcError::ConfigError { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "VALIDATION_FAILED",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::EmptyCatalog { .. } => "EMPTY_CATALOG",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::RenderError { .. } => "RENDER_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError { reason: e.to_string() }
    }
}
