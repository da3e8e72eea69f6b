//! Client error types
//!
//! Validation and authentication failures are raised locally before any
//! network call. Errors are `Clone` so a shared in-flight refresh can hand
//! the same result to every waiting caller.

use shared::SharedError;
use thiserror::Error;

/// Result type for lifecycle operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Message shown when the store cannot be reached at all
pub const NETWORK_FALLBACK_MESSAGE: &str =
    "A network error occurred or the server is unreachable. Please try again.";

/// Why an artifact was rejected before upload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    #[error("Unsupported file type: {file_name}. Please upload a {allowed} file.")]
    UnsupportedExtension { file_name: String, allowed: String },

    #[error("File is too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("No file selected")]
    EmptyFileName,
}

/// Lifecycle controller error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    #[error("You must be signed in to submit or view submissions")]
    Unauthenticated,

    #[error("{message}")]
    Network { message: String },

    #[error("{detail}")]
    Server { status: u16, detail: String },

    #[error("Submission not found: {id}")]
    NotFound { id: String },

    #[error("Invalid submission record: {0}")]
    InvalidRecord(String),

    #[error("Local cache error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Transport failure; the cause is logged by the caller, not shown
    pub fn network() -> Self {
        ClientError::Network {
            message: NETWORK_FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Store failure, preferring the store's own `detail`
    pub fn server(status: u16, detail: Option<String>) -> Self {
        let detail = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Server error: {status}"));
        ClientError::Server { status, detail }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        ClientError::NotFound { id: id.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<SharedError> for ClientError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::InvalidConfig { .. } => ClientError::Config(err.to_string()),
            other => ClientError::InvalidRecord(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
