//! # Error Types
//!
//! Structured error types for rcbeam_core. Only genuinely invalid requests
//! become errors: impossible geometry, negative loads, unknown grades, search
//! grids that exceed their ceiling, unreadable files. A beam that fails a code
//! check is *not* an error; it is a normal [`ComplianceVerdict`] outcome.
//!
//! [`ComplianceVerdict`]: crate::compliance::ComplianceVerdict
//!
//! ## Example
//!
//! ```rust
//! use rcbeam_core::errors::{CalcError, CalcResult};
//!
//! fn validate_width(width_mm: f64) -> CalcResult<()> {
//!     if width_mm <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "width_mm".to_string(),
//!             value: width_mm.to_string(),
//!             reason: "Width must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rcbeam_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for engine operations.
///
/// Each variant carries enough context for a calling layer to explain the
/// problem without re-deriving it.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, inconsistent, non-finite)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material grade or bar size not recognised
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// The requested search grid is larger than allowed
    #[error("Search space too large: {grid_points} grid points exceeds limit of {limit} ({source_of_limit})")]
    SearchSpaceTooLarge {
        grid_points: u64,
        limit: u64,
        source_of_limit: String,
    },

    /// Engine configuration is inconsistent
    #[error("Configuration error in '{section}': {reason}")]
    ConfigError { section: String, reason: String },

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

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
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

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a SearchSpaceTooLarge error
    pub fn search_space_too_large(grid_points: u64, limit: u64, source_of_limit: impl Into<String>) -> Self {
        CalcError::SearchSpaceTooLarge {
            grid_points,
            limit,
            source_of_limit: source_of_limit.into(),
        }
    }

    /// Create a ConfigError
    pub fn config_error(section: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            section: section.into(),
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

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::SearchSpaceTooLarge { .. } => "SEARCH_SPACE_TOO_LARGE",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Reject NaN and infinities before any other range check.
pub(crate) fn ensure_finite(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be finite"));
    }
    Ok(())
}

/// Finite and strictly positive.
pub(crate) fn ensure_positive(field: &str, value: f64) -> CalcResult<()> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}

/// Finite and not negative.
pub(crate) fn ensure_non_negative(field: &str, value: f64) -> CalcResult<()> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must not be negative"));
    }
    Ok(())
}
