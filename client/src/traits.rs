//! Service trait definitions for dependency injection
//!
//! The controller only talks to the store and the local cache through these

use async_trait::async_trait;

use shared::{LeaderboardEntry, Submission, UploadReceipt, UserIdentity};
use crate::error::ClientResult;
use crate::types::Artifact;

/// The authoritative submission store
#[mockall::automock]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Upload an artifact on behalf of `owner`
    async fn upload(&self, artifact: &Artifact, owner: &UserIdentity) -> ClientResult<UploadReceipt>;

    /// Current record for a submission id
    async fn fetch_submission(&self, id: &str) -> ClientResult<Submission>;

    /// Ranked leaderboard as published by the store
    async fn list_leaderboard(&self) -> ClientResult<Vec<LeaderboardEntry>>;
}

/// Per-user local cache of submission records
#[mockall::automock]
#[async_trait]
pub trait SubmissionCache: Send + Sync {
    /// The owner's cached records. Entries that fail validation or belong to
    /// another user are dropped, never returned.
    async fn load(&self, owner_id: &str) -> ClientResult<Vec<Submission>>;

    /// Replace the owner's cached list
    async fn store(&self, owner_id: &str, submissions: &[Submission]) -> ClientResult<()>;
}
