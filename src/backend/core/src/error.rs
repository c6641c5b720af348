//! Service error handling.
//!
//! The authorization layer has its own two-valued taxonomy
//! ([`crate::auth::AuthError`], mapped to 401/403). This module covers the
//! rest of the service: handler and configuration failures, with
//! machine-readable codes and the JSON error envelope shared by all
//! responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// A specialized Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ArtifactNotFound,
    InvalidRequest,
    ConfigurationError,
    InternalError,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Service Error
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors produced by handlers and startup code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(u64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ArtifactNotFound(_) => ErrorCode::ArtifactNotFound,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Configuration(_) => ErrorCode::ConfigurationError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ArtifactNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            error!(code = ?code, "Request failed: {}", self);
        } else {
            warn!(code = ?code, "Request rejected: {}", self);
        }

        counter!(
            "api_errors_total",
            "code" => format!("{:?}", code)
        )
        .increment(1);

        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::ArtifactNotFound(5).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InvalidRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Configuration("missing".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let code = serde_json::to_value(ErrorCode::ArtifactNotFound).unwrap();
        assert_eq!(code, "ARTIFACT_NOT_FOUND");
    }
}
