// Error handling types for the API

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use super::validation::ValidationResult;

/// API error types
///
/// Every failure leaving a handler goes through this type, so the client only
/// ever sees a `{message, code}` body.
#[derive(Debug)]
pub enum ApiError {
    DuplicateEmail,
    InvalidCredentials,
    FederatedAuthFailure,
    InvalidToken,
    ExpiredToken,
    Unauthorized(String),
    ValidationError(String),
    InternalServer(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::DuplicateEmail => write!(f, "Duplicate Email"),
            ApiError::InvalidCredentials => write!(f, "Invalid Credentials"),
            ApiError::FederatedAuthFailure => write!(f, "Federated Auth Failure"),
            ApiError::InvalidToken => write!(f, "Invalid Token"),
            ApiError::ExpiredToken => write!(f, "Expired Token"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
    /// Absent from bodies that only carry a message
    #[serde(default)]
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, code) = match self {
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "User already exists".to_string(),
                "DUPLICATE_EMAIL",
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid Email or Password".to_string(),
                "INVALID_CREDENTIALS",
            ),
            ApiError::FederatedAuthFailure => (
                StatusCode::BAD_REQUEST,
                "Google authentication failed".to_string(),
                "FEDERATED_AUTH_FAILURE",
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Not authorized, token failed".to_string(),
                "INVALID_TOKEN",
            ),
            ApiError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "Not authorized, token expired".to_string(),
                "EXPIRED_TOKEN",
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected malformed request body");
        ApiError::ValidationError(rejection.body_text())
    }
}
