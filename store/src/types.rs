//! Type definitions for the store
//!
//! Data types used by the store that are not service traits.

use std::path::PathBuf;

use shared::Scores;

/// Result of evaluating one submission archive
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Completed {
        scores: Scores,
        summary: String,
        logs: Option<String>,
    },
    Failed {
        logs: Option<String>,
    },
}

impl EvaluationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationOutcome::Completed { .. })
    }
}

/// An uploaded archive as it arrived over multipart
#[derive(Debug, Clone)]
pub struct IncomingArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub user_id: String,
    pub user_name: String,
}

/// Where an accepted archive was written
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub size: u64,
}
