use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Student not found in the current roster")]
    StudentNotFound,

    #[error("Export file not found: {0}")]
    FileNotFound(String),

    #[error("The roster is empty, nothing to send")]
    EmptyRoster,

    #[error("Export file has no students: {0}")]
    EmptyExport(String),

    #[error("No class selected")]
    NoClassSelected,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed export file: {0}")]
    Parse(String),

    #[error("External service error: {0}")]
    ExternalIo(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ClassNotFound(_)
            | AppError::StudentNotFound
            | AppError::FileNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::EmptyRoster | AppError::EmptyExport(_) | AppError::NoClassSelected => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::BadRequest(msg) | AppError::Parse(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ExternalIo(msg) => {
                error!("external service failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "External service error".to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
