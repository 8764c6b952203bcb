use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::versioning::VersionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Protected: {0}")]
    Protected(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No active version: {0}")]
    NoActiveVersion(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<VersionError> for AppError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            VersionError::AlreadyExists(what) => {
                AppError::AlreadyExists(format!("{what} already exists"))
            }
            VersionError::InvalidState(msg) => AppError::UnprocessableEntity(msg),
            VersionError::InvalidInput(msg) => AppError::Validation(msg),
            err @ VersionError::Conflict { .. } => AppError::Conflict(err.to_string()),
            VersionError::Protected(branch) => {
                AppError::Protected(format!("branch '{branch}' cannot be deleted"))
            }
            err @ VersionError::NoActiveVersion { .. } => AppError::NoActiveVersion(err.to_string()),
            err @ (VersionError::Store { .. } | VersionError::Blob { .. }) => {
                AppError::Storage(err.to_string())
            }
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_STATE", msg.clone())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Protected(msg) => (StatusCode::FORBIDDEN, "PROTECTED", msg.clone()),
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, "ALREADY_EXISTS", msg.clone()),
            AppError::Conflict(msg) => {
                tracing::warn!("Retry budget exhausted: {msg}");
                (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "Concurrent update in progress, retry the request".to_string(),
                )
            }
            AppError::NoActiveVersion(msg) => {
                (StatusCode::NOT_FOUND, "NO_ACTIVE_VERSION", msg.clone())
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobError;

    #[test]
    fn test_domain_errors_map_to_stable_statuses() {
        let cases = [
            (VersionError::NotFound("prompt p".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                VersionError::AlreadyExists("branch 'b'".into()),
                StatusCode::CONFLICT,
                "ALREADY_EXISTS",
            ),
            (
                VersionError::InvalidState("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_STATE",
            ),
            (
                VersionError::Conflict {
                    operation: "update active version",
                    attempts: 3,
                },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (VersionError::Protected("main".into()), StatusCode::FORBIDDEN, "PROTECTED"),
            (
                VersionError::NoActiveVersion {
                    branch: "main".into(),
                },
                StatusCode::NOT_FOUND,
                "NO_ACTIVE_VERSION",
            ),
        ];

        for (err, status, code) in cases {
            let (got_status, got_code, _) = AppError::from(err).parts();
            assert_eq!(got_status, status);
            assert_eq!(got_code, code);
        }
    }

    #[test]
    fn test_adapter_details_are_not_leaked() {
        let err = VersionError::blob(
            "read prompt content",
            BlobError::Backend("s3 host 10.0.0.7 refused".into()),
        );
        let (status, code, message) = AppError::from(err).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "STORAGE_ERROR");
        assert!(!message.contains("10.0.0.7"));
    }
}
