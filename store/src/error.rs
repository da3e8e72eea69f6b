//! Store-specific error types
//!
//! Every variant maps to an HTTP status and is rendered as an `{"detail": ...}`
//! body, the failure payload clients surface verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorDetail, SharedError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Unsupported file type: {file_name}. Please upload a {allowed} file.")]
    UnsupportedFileType { file_name: String, allowed: String },

    #[error("File size {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Upload exceeds the request body limit: {0}")]
    BodyTooLarge(String),

    #[error("Submission not found: {id}")]
    NotFound { id: String },

    #[error("Invalid multipart payload: {message}")]
    Multipart { message: String },

    #[error("An error occurred while processing the file: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("{0}")]
    Shared(#[from] SharedError),
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::MissingField { .. }
            | StoreError::UnsupportedFileType { .. }
            | StoreError::Multipart { .. } => StatusCode::BAD_REQUEST,
            StoreError::PayloadTooLarge { .. } | StoreError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Shared(SharedError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            StoreError::Storage(_)
            | StoreError::Config(_)
            | StoreError::ServerStartup(_)
            | StoreError::Shared(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorDetail::new(self.to_string()))).into_response()
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StoreError::MissingField { field: "file" }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::PayloadTooLarge { size: 11, limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            StoreError::NotFound { id: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        let transition = SharedError::InvalidTransition {
            id: "x".into(),
            from: "Completed".into(),
            to: "Failed".into(),
        };
        assert_eq!(StoreError::from(transition).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unsupported_type_message() {
        let err = StoreError::UnsupportedFileType {
            file_name: "model.exe".into(),
            allowed: ".zip or .tar.gz".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported file type: model.exe. Please upload a .zip or .tar.gz file."
        );
    }
}
