//! Authoritative submission registry
//!
//! Pure business logic with no I/O dependencies. The store keeps it behind an
//! async `RwLock`; evaluation tasks report outcomes through `record_outcome`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use shared::{LeaderboardEntry, SharedError, Submission, SubmissionStatus};

use crate::core::leaderboard::rank_submissions;
use crate::error::{StoreError, StoreResult};
use crate::types::EvaluationOutcome;

/// All submissions known to the store, keyed by id
#[derive(Debug, Default)]
pub struct SubmissionRegistry {
    submissions: HashMap<String, Submission>,
}

impl SubmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accepted upload in `Processing`
    pub fn accept(
        &mut self,
        id: &str,
        user_id: &str,
        user_name: &str,
        file_name: &str,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<Submission> {
        if self.submissions.contains_key(id) {
            return Err(SharedError::invalid_record(format!("duplicate submission id {id}")).into());
        }

        let submission = Submission::processing(id, user_id, user_name, file_name, submitted_at);
        self.submissions.insert(id.to_string(), submission.clone());
        Ok(submission)
    }

    pub fn get(&self, id: &str) -> StoreResult<Submission> {
        self.submissions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// A user's submissions, newest first
    pub fn for_user(&self, user_id: &str) -> Vec<Submission> {
        let mut owned: Vec<Submission> = self
            .submissions
            .values()
            .filter(|s| s.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then_with(|| a.id.cmp(&b.id)));
        owned
    }

    /// Apply an evaluation outcome. Only `Processing` submissions move; a
    /// terminal submission rejects the outcome.
    pub fn record_outcome(&mut self, id: &str, outcome: EvaluationOutcome) -> StoreResult<Submission> {
        let current = self
            .submissions
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let updated = match outcome {
            EvaluationOutcome::Completed { scores, summary, logs } => current.complete(scores, summary, logs)?,
            EvaluationOutcome::Failed { logs } => current.fail(logs)?,
        };

        self.submissions.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        rank_submissions(self.submissions.values())
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn count_in(&self, status: SubmissionStatus) -> usize {
        self.submissions.values().filter(|s| s.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use shared::Scores;
    use tokio_test::{assert_err, assert_ok};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 20, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn completed(score: f64) -> EvaluationOutcome {
        EvaluationOutcome::Completed {
            scores: Scores::new(score, score, score).unwrap(),
            summary: "Evaluation finished.".to_string(),
            logs: None,
        }
    }

    #[test]
    fn test_accept_registers_processing() {
        let mut registry = SubmissionRegistry::new();
        let submission = assert_ok!(registry.accept("a", "u1", "Ada", "model.zip", at(0)));

        assert_eq!(submission.status, SubmissionStatus::Processing);
        assert_eq!(registry.get("a").unwrap(), submission);
        assert_eq!(registry.count_in(SubmissionStatus::Processing), 1);
        assert_err!(registry.accept("a", "u1", "Ada", "model.zip", at(1)));
    }

    #[test]
    fn test_outcome_applies_once() {
        let mut registry = SubmissionRegistry::new();
        registry.accept("a", "u1", "Ada", "model.zip", at(0)).unwrap();

        let done = assert_ok!(registry.record_outcome("a", completed(0.8)));
        assert_eq!(done.status, SubmissionStatus::Completed);

        let late_failure = registry.record_outcome("a", EvaluationOutcome::Failed { logs: None });
        assert!(matches!(
            late_failure,
            Err(StoreError::Shared(SharedError::InvalidTransition { .. }))
        ));
        assert_eq!(registry.get("a").unwrap().status, SubmissionStatus::Completed);
    }

    #[test]
    fn test_outcome_for_unknown_id() {
        let mut registry = SubmissionRegistry::new();
        let result = registry.record_outcome("missing", completed(0.5));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_for_user_newest_first() {
        let mut registry = SubmissionRegistry::new();
        registry.accept("old", "u1", "Ada", "a.zip", at(0)).unwrap();
        registry.accept("new", "u1", "Ada", "b.zip", at(5)).unwrap();
        registry.accept("other", "u2", "Bob", "c.zip", at(3)).unwrap();

        let ids: Vec<String> = registry.for_user("u1").into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert!(registry.for_user("nobody").is_empty());
    }
}
