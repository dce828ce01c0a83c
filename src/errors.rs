//! Unified error types for the CRM backend.
//!
//! Business-rule failures carry a human-readable message and map onto an
//! [`ErrorKind`] so callers (and tests) can branch on the category without
//! parsing message text.

use serde::Serialize;
use thiserror::Error;

/// Machine-readable category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input failed a validation rule
    ValidationFailed,
    /// A referenced record does not exist
    NotFound,
    /// The write would violate a uniqueness rule
    Conflict,
    /// Storage, I/O or configuration failure
    Internal,
}

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    /// Input validation failed (bad phone, non-positive price, ...)
    #[error("{message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A referenced customer or product is missing
    #[error("{message}")]
    NotFound {
        /// Human-readable reason
        message: String,
    },

    /// Duplicate value for a unique field
    #[error("{message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (job log files, listener binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error at the API boundary
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::ValidationFailed,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::validation("Price must be positive").kind(),
            ErrorKind::ValidationFailed
        );
        assert_eq!(
            Error::not_found("Customer does not exist").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::conflict("Email already exists").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_business_errors_display_bare_message() {
        assert_eq!(
            Error::conflict("Email already exists").to_string(),
            "Email already exists"
        );
    }

    #[test]
    fn test_kind_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ValidationFailed).unwrap();
        assert_eq!(json, "\"VALIDATION_FAILED\"");
    }
}
