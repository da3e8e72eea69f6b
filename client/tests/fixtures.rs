//! Test fixtures for lifecycle controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use client::{Artifact, ClientError, ClientResult, SubmissionStore};
use shared::{LeaderboardEntry, PollPolicy, Scores, Submission, UploadReceipt, UserIdentity};

pub const OWNER: &str = "user-1";

pub fn owner() -> UserIdentity {
    UserIdentity::new(OWNER).with_display_name("Ada")
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn processing(id: &str) -> Submission {
    Submission::processing(id, OWNER, "Ada", "model.zip", at(0))
}

pub fn completed(id: &str) -> Submission {
    processing(id)
        .complete(Scores::new(0.82, 0.74, 0.91).unwrap(), "Evaluation finished.", Some("done".into()))
        .unwrap()
}

pub fn failed(id: &str, logs: &str) -> Submission {
    processing(id).fail(Some(logs.to_string())).unwrap()
}

pub fn receipt(id: &str, file_name: &str, minutes: i64) -> UploadReceipt {
    UploadReceipt {
        submission_id: id.to_string(),
        file_name: file_name.to_string(),
        submitted_at: at(minutes),
        message: None,
    }
}

pub fn archive(name: &str, size: usize) -> Artifact {
    Artifact::new(name, vec![0u8; size])
}

pub fn fast_poll(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        initial_interval_ms: 5,
        max_interval_ms: 20,
        backoff_factor: 2.0,
        max_attempts,
    }
}

/// Store whose status query suspends before answering, counting queries
pub struct SlowStore {
    pub record: Submission,
    pub calls: Arc<AtomicUsize>,
    pub delay_ms: u64,
}

impl SlowStore {
    pub fn new(record: Submission) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                record,
                calls: Arc::clone(&calls),
                delay_ms: 50,
            },
            calls,
        )
    }
}

#[async_trait]
impl SubmissionStore for SlowStore {
    async fn upload(&self, _artifact: &Artifact, _owner: &UserIdentity) -> ClientResult<UploadReceipt> {
        Err(ClientError::server(501, None))
    }

    async fn fetch_submission(&self, _id: &str) -> ClientResult<Submission> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        Ok(self.record.clone())
    }

    async fn list_leaderboard(&self) -> ClientResult<Vec<LeaderboardEntry>> {
        Ok(Vec::new())
    }
}
