//! Service trait definitions for dependency injection
//!
//! All I/O operations are abstracted through these traits for testability

use async_trait::async_trait;

use shared::Submission;
use crate::error::StoreResult;
use crate::types::{EvaluationOutcome, StoredArtifact};

/// Persistence for uploaded archives
#[mockall::automock]
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Write the archive for `submission_id`, keeping the matched extension
    async fn save(&self, submission_id: &str, extension: &str, bytes: &[u8]) -> StoreResult<StoredArtifact>;
}

/// Evaluation backend: runs a submission and reports its outcome
#[mockall::automock]
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate an accepted submission. Called once per submission from a
    /// background task; may take arbitrarily long.
    async fn evaluate(&self, submission: &Submission, artifact: &StoredArtifact) -> EvaluationOutcome;
}
