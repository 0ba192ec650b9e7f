use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

use crate::models::RoleParseError;

/// Realm advertised in `WWW-Authenticate` on 401 responses.
pub const AUTH_REALM: &str = "Basic realm=\"identity\", charset=\"UTF-8\"";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access forbidden")]
    Forbidden,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateUsername(_) => AppError::Coded {
                status: StatusCode::CONFLICT,
                code: ErrorCode::DuplicateUsername,
                message: err.to_string(),
            },
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::InvalidCredentials => AppError::Coded {
                status: StatusCode::UNAUTHORIZED,
                code: ErrorCode::InvalidCredentials,
                message: err.to_string(),
            },
            UserError::Unauthenticated => AppError::Unauthorized(err.to_string()),
            UserError::Forbidden => AppError::Forbidden(err.to_string()),
            UserError::Database(msg) => {
                tracing::error!(error = %msg, "User store failure");
                AppError::Coded {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: ErrorCode::StorageError,
                    message: ErrorCode::StorageError.default_message().to_string(),
                }
            }
            UserError::PasswordHash(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        let mut response = app_error.into_response();

        if response.status() == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM),
            );
        }

        response
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<RoleParseError> for UserError {
    fn from(err: RoleParseError) -> Self {
        UserError::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(err: validator::ValidationErrors) -> Self {
        UserError::Validation(err.to_string())
    }
}
