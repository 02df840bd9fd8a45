//! Error Types for the Syllabus API
//!
//! This module defines error handling for the HTTP layer:
//! - `ApiError` struct for structured error responses
//! - `ErrorCode` enum for categorizing errors
//! - `IntoResponse` implementation for Axum HTTP responses
//! - the mapping from the domain taxonomy (`LmsError`) to HTTP
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use syllabus_core::{DenyReason, LmsError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Authorization Errors (403, 409)
    // ========================================================================
    /// Authenticated but not allowed
    Forbidden,

    /// The actor's role cannot perform the action at all
    InsufficientRole,

    /// Only the course instructor may perform the action
    NotOwner,

    /// The learner must be enrolled in the course first
    NotEnrolled,

    /// The learner is already actively enrolled
    AlreadyEnrolled,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    ValidationFailed,
    InvalidInput,
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    EntityNotFound,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    InternalError,

    /// Backing store is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden
            | ErrorCode::InsufficientRole
            | ErrorCode::NotOwner
            | ErrorCode::NotEnrolled => StatusCode::FORBIDDEN,

            ErrorCode::AlreadyEnrolled => StatusCode::CONFLICT,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::InsufficientRole => "Your role does not allow this action",
            ErrorCode::NotOwner => "Only the course instructor can do this",
            ErrorCode::NotEnrolled => "You must be enrolled in this course",
            ErrorCode::AlreadyEnrolled => "Already enrolled in this course",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidFormat => "Invalid format",

            ErrorCode::EntityNotFound => "Entity not found",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<DenyReason> for ErrorCode {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => ErrorCode::Unauthorized,
            DenyReason::InsufficientRole => ErrorCode::InsufficientRole,
            DenyReason::NotOwner => ErrorCode::NotOwner,
            DenyReason::NotEnrolled => ErrorCode::NotEnrolled,
            DenyReason::AlreadyEnrolled => ErrorCode::AlreadyEnrolled,
            DenyReason::Forbidden => ErrorCode::Forbidden,
        }
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, deny reasons)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    /// Authorization denial carrying its reason code.
    pub fn denied(reason: DenyReason) -> Self {
        Self::from_code(reason.into()).with_details(serde_json::json!({
            "reason": reason.as_str(),
        }))
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn entity_not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Map the domain taxonomy onto HTTP.
///
/// Store and cache internals are logged, never returned to the client.
impl From<LmsError> for ApiError {
    fn from(err: LmsError) -> Self {
        match err {
            LmsError::Unauthenticated => ApiError::from_code(ErrorCode::Unauthorized),
            LmsError::Denied(reason) => ApiError::denied(reason),
            LmsError::NotFound { resource, id } => {
                ApiError::entity_not_found(resource.as_str(), id)
            }
            LmsError::ValidationFailure { field, reason } => {
                ApiError::validation_failed(format!("{}: {}", field, reason)).with_details(
                    serde_json::json!({
                        "field": field,
                        "reason": reason,
                    }),
                )
            }
            LmsError::BackingStoreFailure { reason } => {
                tracing::error!(reason = %reason, "backing store failure");
                ApiError::from_code(ErrorCode::ServiceUnavailable)
            }
            LmsError::Cache(err) => {
                tracing::error!(error = %err, "cache failure");
                ApiError::internal_error("Internal cache error")
            }
            LmsError::Config(err) => {
                tracing::error!(error = %err, "configuration error");
                ApiError::internal_error("Server configuration error")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
