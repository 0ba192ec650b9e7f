//! Type-safe error codes for API responses.
//!
//! Each code carries:
//! - a string identifier for clients (e.g., "DUPLICATE_USERNAME")
//! - an integer for logging and monitoring (e.g., 1101)
//! - a default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1099)
    /// Request validation failed
    ValidationError,

    /// Requested resource was not found
    NotFound,

    /// Authentication credentials are missing or invalid
    Unauthorized,

    /// Authenticated caller lacks the required role
    Forbidden,

    /// JSON extraction from request body failed
    JsonExtraction,

    // Identity errors (1100-1199)
    /// A user with the submitted username already exists
    DuplicateUsername,

    /// Username/password pair did not match a stored credential
    InvalidCredentials,

    // Server errors (1500-1599)
    /// An unexpected internal server error occurred
    InternalError,

    // Storage errors (2000-2099)
    /// The credential store could not complete the request
    StorageError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InternalError => "INTERNAL_ERROR",
            Self::StorageError => "STORAGE_ERROR",
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::NotFound => 1004,
            Self::Unauthorized => 1005,
            Self::Forbidden => 1006,
            Self::JsonExtraction => 1009,
            Self::DuplicateUsername => 1101,
            Self::InvalidCredentials => 1102,
            Self::InternalError => 1500,
            Self::StorageError => 2001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::NotFound => "Requested resource was not found",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access forbidden",
            Self::JsonExtraction => "Failed to extract JSON from request body",
            Self::DuplicateUsername => "Username is already taken",
            Self::InvalidCredentials => "Invalid username or password",
            Self::InternalError => "An unexpected error occurred",
            Self::StorageError => "The credential store is unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
