//! Error types for the PDF Toolbox API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use pdftoolbox_core::TransformError;

use crate::policy::Denied;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("free limit of {limit} transforms reached")]
    EntitlementDenied { limit: u32 },

    #[error("corrupt input document: {0}")]
    CorruptInput(String),

    #[error("transform timed out after {0}ms")]
    Timeout(u64),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::UnsupportedOperation(name) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_OPERATION",
                format!("'{name}' is not an available operation"),
            ),
            ApiError::EntitlementDenied { limit } => (
                StatusCode::FORBIDDEN,
                "FREE_LIMIT_REACHED",
                format!("free limit of {limit} transforms reached"),
            ),
            ApiError::CorruptInput(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CORRUPT_INPUT",
                format!("document failed to parse: {msg}"),
            ),
            ApiError::Timeout(ms) => (
                StatusCode::REQUEST_TIMEOUT,
                "TIMEOUT",
                format!("transform timed out after {ms}ms"),
            ),
            ApiError::ArtifactNotFound(name) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("artifact '{name}' not found"),
            ),
            ApiError::Storage(e) => {
                tracing::error!("storage failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_UNAVAILABLE",
                    "storage unavailable".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        if let ApiError::EntitlementDenied { limit } = &self {
            body["limit"] = json!(limit);
        }

        (status, Json(body)).into_response()
    }
}

impl From<TransformError> for ApiError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            TransformError::UnsupportedOperation(name) => ApiError::UnsupportedOperation(name),
            TransformError::CorruptInput(msg) => ApiError::CorruptInput(msg),
            TransformError::OperationFailed(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<Denied> for ApiError {
    fn from(err: Denied) -> Self {
        match err {
            Denied::FreeLimitReached { limit } => ApiError::EntitlementDenied { limit },
        }
    }
}
