//! API error taxonomy.
//!
//! Every engine operation returns `Result<_, ApiError>`; the gateway maps
//! each variant to a fixed HTTP status and error code so clients can branch
//! on cause. NotFound / InvalidArgument / Unauthorized / Forbidden stay
//! distinct end to end.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::types::{ApiResponse, error_codes};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgument(_) | Self::InsufficientBalance => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::InvalidArgument(_) => error_codes::INVALID_PARAMETER,
            Self::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
            Self::Unauthorized(_) => error_codes::AUTH_FAILED,
            Self::Forbidden(_) => error_codes::ACCESS_DENIED,
            Self::Database(_) | Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();

        // Never leak database details to the client
        let msg = match &self {
            Self::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            Self::Internal(m) => {
                tracing::error!("Internal error: {}", m);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiResponse::<()>::error(self.code(), msg);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            ApiError::NotFound("x".into()).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidArgument("x".into()).http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientBalance.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Internal("x".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes_distinct() {
        let codes = [
            ApiError::NotFound("x".into()).code(),
            ApiError::InvalidArgument("x".into()).code(),
            ApiError::InsufficientBalance.code(),
            ApiError::Unauthorized("x".into()).code(),
            ApiError::Forbidden("x".into()).code(),
            ApiError::Internal("x".into()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b, "error codes must stay distinct");
            }
        }
    }
}
