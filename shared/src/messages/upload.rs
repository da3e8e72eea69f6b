//! Store ↔ Client payloads
//!
//! Submission records themselves travel as `Submission`; these are the
//! envelopes around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acknowledgment of an accepted upload
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub submission_id: String,
    /// Canonical file name as recorded by the store
    pub file_name: String,
    /// Canonical submission timestamp
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Failure payload returned with any 4xx/5xx response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}
