//! Error types for the Tensaku server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::DocumentError;
use crate::review::ReviewError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Review(e) => match e {
                ReviewError::ReviewInProgress(_) => {
                    (StatusCode::CONFLICT, "review_in_progress", e.to_string())
                }
                ReviewError::StaleGeneration { .. } => {
                    (StatusCode::CONFLICT, "stale_review", e.to_string())
                }
                ReviewError::Stream(_) => {
                    tracing::warn!("Review stream error: {}", e);
                    (StatusCode::BAD_GATEWAY, "stream_error", e.to_string())
                }
            },
            AppError::Document(e) => match e {
                DocumentError::TooLarge(..) => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "document_too_large", e.to_string())
                }
                DocumentError::Html(_) => (StatusCode::BAD_REQUEST, "invalid_html", e.to_string()),
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(error: AppError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ReviewError::ReviewInProgress(1).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(ReviewError::Stream("reset".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(DocumentError::TooLarge(10, 5).into()),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status(sqlx::Error::RowNotFound.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
