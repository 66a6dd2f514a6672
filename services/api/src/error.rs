//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{jwt::TokenError, password::PasswordError, scoring::ScoringError};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Missing, invalid or expired token, unknown account, bad credentials
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is authenticated but not yet allowed to do this
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The scoring service could not be reached
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The scoring service answered with a non-success status
    #[error("Upstream rejected the request with status {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    /// The scoring service answered 200 with an unexpected body
    #[error("Upstream response malformed: {0}")]
    UpstreamMalformed(String),

    /// Stored state contradicts an invariant
    #[error("Data inconsistency: {0}")]
    DataInconsistency(String),

    /// Database error
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] DatabaseError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::PreconditionFailed(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamUnavailable(_) | ApiError::UpstreamRejected { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::UpstreamMalformed(_)
            | ApiError::DataInconsistency(_)
            | ApiError::StorageFailure(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::ValidationFailed(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::PreconditionFailed(msg)
            | ApiError::NotFound(msg) => json!({ "error": msg }),
            ApiError::UpstreamUnavailable(cause) => json!({
                "error": "scoring service unavailable",
                "details": cause,
            }),
            ApiError::UpstreamRejected { status, body } => json!({
                "error": "scoring service error",
                "details": format!("status {}: {}", status, body),
            }),
            ApiError::UpstreamMalformed(cause) => json!({
                "error": "failed to parse scoring service response",
                "details": cause,
            }),
            ApiError::DataInconsistency(_) => json!({ "error": "internal server error" }),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                json!({ "error": "internal server error" })
            }
            ApiError::StorageFailure(e) => {
                error!("Storage failure: {}", e);
                json!({ "error": "storage failure" })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => {
                ApiError::unauthenticated("invalid token")
            }
            TokenError::MissingSecret | TokenError::Signing(_) => {
                ApiError::internal(format!("failed to generate token: {}", err))
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::Unavailable(cause) => ApiError::UpstreamUnavailable(cause),
            ScoringError::Rejected { status, body } => ApiError::UpstreamRejected { status, body },
            ScoringError::Malformed(cause) => ApiError::UpstreamMalformed(cause),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
