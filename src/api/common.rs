//! Shared API response types
//!
//! Common error body structure used across all API endpoints, plus
//! conversions from the service error enums to HTTP responses.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::{EntryServiceError, UserServiceError, WeblogServiceError};

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Error half of an API handler result
pub type ErrorResponse = (StatusCode, Json<ApiError>);

/// 404 response
pub fn not_found(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("not_found", message)),
    )
}

/// 400 response
pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new("bad_request", message)),
    )
}

/// 409 response
pub fn conflict(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::CONFLICT,
        Json(ApiError::new("conflict", message)),
    )
}

/// 500 response; the cause is logged, not exposed
pub fn internal_error(err: impl std::fmt::Display) -> ErrorResponse {
    tracing::error!("Internal error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new("internal_error", "Internal server error")),
    )
}

impl From<EntryServiceError> for ErrorResponse {
    fn from(err: EntryServiceError) -> Self {
        match err {
            EntryServiceError::NotFound(msg) => not_found(msg),
            EntryServiceError::ValidationError(msg) => bad_request(msg),
            EntryServiceError::DuplicateAnchor(msg) => conflict(msg),
            EntryServiceError::InternalError(e) => internal_error(e),
        }
    }
}

impl From<WeblogServiceError> for ErrorResponse {
    fn from(err: WeblogServiceError) -> Self {
        match err {
            WeblogServiceError::NotFound(msg) => not_found(msg),
            WeblogServiceError::ValidationError(msg) => bad_request(msg),
            WeblogServiceError::DuplicateHandle(msg) | WeblogServiceError::DuplicateCategory(msg) => {
                conflict(msg)
            }
            WeblogServiceError::InternalError(e) => internal_error(e),
        }
    }
}

impl From<UserServiceError> for ErrorResponse {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::NotFound(msg) => not_found(msg),
            UserServiceError::ValidationError(msg) => bad_request(msg),
            UserServiceError::DuplicateUsername(msg) => conflict(msg),
            UserServiceError::InternalError(e) => internal_error(e),
        }
    }
}
