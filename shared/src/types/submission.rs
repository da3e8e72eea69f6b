//! Submission records and their evaluation status
//!
//! `Submission` is the strict domain shape. It is (de)serialized through
//! `SubmissionRecord`, the flat camelCase wire/cache layout, so that every read
//! from the network or from a cache file is checked against the record
//! invariant:
//!
//! - scores and evaluation summary are present iff the status is `Completed`
//! - all three scores travel together, each finite and within `[0, 1]`
//! - logs never accompany the initial `Created` state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Generate a fresh store-assigned submission id
pub fn new_submission_id() -> String {
    Uuid::new_v4().to_string()
}

/// Evaluation status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Client-optimistic, not yet acknowledged by the store
    Created,
    /// Accepted, evaluation in flight
    Processing,
    /// Terminal, scores present
    Completed,
    /// Terminal, scores absent
    Failed,
}

impl SubmissionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Completed | SubmissionStatus::Failed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    /// Same-state moves are not transitions and return false.
    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, next),
            (Created, Processing) | (Processing, Completed) | (Processing, Failed)
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Created => write!(f, "Created"),
            SubmissionStatus::Processing => write!(f, "Processing"),
            SubmissionStatus::Completed => write!(f, "Completed"),
            SubmissionStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SubmissionStatus::Created),
            "processing" => Ok(SubmissionStatus::Processing),
            "completed" => Ok(SubmissionStatus::Completed),
            "failed" => Ok(SubmissionStatus::Failed),
            _ => Err(format!("Unknown submission status: {s}")),
        }
    }
}

/// The three evaluation metrics, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub bleu4_score: f64,
    pub custom_bleu_score: f64,
    pub entity_coverage_score: f64,
}

impl Scores {
    pub fn new(bleu4: f64, custom_bleu: f64, entity_coverage: f64) -> SharedResult<Self> {
        let scores = Self {
            bleu4_score: bleu4,
            custom_bleu_score: custom_bleu,
            entity_coverage_score: entity_coverage,
        };
        scores.validate()?;
        Ok(scores)
    }

    pub fn validate(&self) -> SharedResult<()> {
        for (metric, value) in [
            ("bleu4Score", self.bleu4_score),
            ("customBleuScore", self.custom_bleu_score),
            ("entityCoverageScore", self.entity_coverage_score),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SharedError::ScoreOutOfRange { metric, value });
            }
        }
        Ok(())
    }
}

/// Flat wire and cache layout of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub file_name: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleu4_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_bleu_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_coverage_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// One user-uploaded evaluation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SubmissionRecord", into = "SubmissionRecord")]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub file_name: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub scores: Option<Scores>,
    pub evaluation_summary: Option<String>,
    pub logs: Option<String>,
}

impl Submission {
    /// A freshly accepted submission whose evaluation is in flight
    pub fn processing(
        id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        file_name: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            file_name: file_name.into(),
            submitted_at,
            status: SubmissionStatus::Processing,
            scores: None,
            evaluation_summary: None,
            logs: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Terminal success: attaches scores and summary
    pub fn complete(
        &self,
        scores: Scores,
        summary: impl Into<String>,
        logs: Option<String>,
    ) -> SharedResult<Submission> {
        self.check_transition(SubmissionStatus::Completed)?;
        scores.validate()?;
        let completed = Submission {
            status: SubmissionStatus::Completed,
            scores: Some(scores),
            evaluation_summary: Some(summary.into()),
            logs: logs.or_else(|| self.logs.clone()),
            ..self.clone()
        };
        completed.validate()?;
        Ok(completed)
    }

    /// Terminal failure: no scores, logs explain why
    pub fn fail(&self, logs: Option<String>) -> SharedResult<Submission> {
        self.check_transition(SubmissionStatus::Failed)?;
        Ok(Submission {
            status: SubmissionStatus::Failed,
            scores: None,
            evaluation_summary: None,
            logs: logs.or_else(|| self.logs.clone()),
            ..self.clone()
        })
    }

    fn check_transition(&self, next: SubmissionStatus) -> SharedResult<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(SharedError::InvalidTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Check the record invariant
    pub fn validate(&self) -> SharedResult<()> {
        if self.id.trim().is_empty() {
            return Err(SharedError::invalid_record("empty submission id"));
        }
        if self.user_id.trim().is_empty() {
            return Err(SharedError::invalid_record(format!("submission {} has no owner", self.id)));
        }

        match self.status {
            SubmissionStatus::Completed => {
                let scores = self.scores.as_ref().ok_or_else(|| {
                    SharedError::invalid_record(format!("completed submission {} has no scores", self.id))
                })?;
                scores.validate()?;
                if self.evaluation_summary.is_none() {
                    return Err(SharedError::invalid_record(format!(
                        "completed submission {} has no evaluation summary",
                        self.id
                    )));
                }
            }
            status => {
                if self.scores.is_some() || self.evaluation_summary.is_some() {
                    return Err(SharedError::invalid_record(format!(
                        "{status} submission {} carries evaluation results",
                        self.id
                    )));
                }
                if status == SubmissionStatus::Created && self.logs.is_some() {
                    return Err(SharedError::invalid_record(format!(
                        "unacknowledged submission {} carries logs",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<SubmissionRecord> for Submission {
    type Error = SharedError;

    fn try_from(record: SubmissionRecord) -> Result<Self, Self::Error> {
        let scores = match (record.bleu4_score, record.custom_bleu_score, record.entity_coverage_score) {
            (Some(bleu4), Some(custom), Some(coverage)) => Some(Scores::new(bleu4, custom, coverage)?),
            (None, None, None) => None,
            _ => {
                return Err(SharedError::invalid_record(format!(
                    "submission {} has a partial score set",
                    record.id
                )));
            }
        };

        let submission = Submission {
            id: record.id,
            user_id: record.user_id,
            user_name: record.user_name,
            file_name: record.file_name,
            submitted_at: record.submitted_at,
            status: record.status,
            scores,
            evaluation_summary: record.evaluation_summary,
            logs: record.logs,
        };
        submission.validate()?;
        Ok(submission)
    }
}

impl From<Submission> for SubmissionRecord {
    fn from(submission: Submission) -> Self {
        let scores = submission.scores;
        SubmissionRecord {
            id: submission.id,
            user_id: submission.user_id,
            user_name: submission.user_name,
            file_name: submission.file_name,
            submitted_at: submission.submitted_at,
            status: submission.status,
            bleu4_score: scores.map(|s| s.bleu4_score),
            custom_bleu_score: scores.map(|s| s.custom_bleu_score),
            entity_coverage_score: scores.map(|s| s.entity_coverage_score),
            evaluation_summary: submission.evaluation_summary,
            logs: submission.logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn processing() -> Submission {
        Submission::processing(
            "sub-1",
            "user-1",
            "Mock User",
            "model.zip",
            Utc.with_ymd_and_hms(2024, 7, 20, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_terminal_states_never_transition() {
        use SubmissionStatus::*;
        let all = [Created, Processing, Completed, Failed];

        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in all {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next} must be rejected");
            }
        }

        assert!(Created.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Created.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Processing));
    }

    #[test]
    fn test_complete_attaches_scores_and_summary() {
        let scores = Scores::new(0.78, 0.75, 0.85).unwrap();
        let done = processing().complete(scores, "Good overall performance.", None).unwrap();

        assert_eq!(done.status, SubmissionStatus::Completed);
        assert_eq!(done.scores, Some(scores));
        assert_eq!(done.evaluation_summary.as_deref(), Some("Good overall performance."));
        assert!(done.complete(scores, "again", None).is_err());
        assert!(done.fail(None).is_err());
    }

    #[test]
    fn test_fail_keeps_scores_absent() {
        let failed = processing().fail(Some("timeout".to_string())).unwrap();

        assert_eq!(failed.status, SubmissionStatus::Failed);
        assert!(failed.scores.is_none());
        assert!(failed.evaluation_summary.is_none());
        assert_eq!(failed.logs.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_scores_out_of_range_rejected() {
        assert!(Scores::new(1.2, 0.5, 0.5).is_err());
        assert!(Scores::new(0.5, -0.01, 0.5).is_err());
        assert!(Scores::new(0.5, 0.5, f64::NAN).is_err());
        assert!(Scores::new(0.0, 1.0, 0.5).is_ok());
    }

    #[test]
    fn test_wire_layout_is_flat_camel_case() {
        let scores = Scores::new(0.5, 0.4, 0.3).unwrap();
        let done = processing().complete(scores, "ok", None).unwrap();
        let json = serde_json::to_value(&done).unwrap();

        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["fileName"], "model.zip");
        assert_eq!(json["status"], "Completed");
        assert_eq!(json["bleu4Score"], 0.5);
        assert_eq!(json["entityCoverageScore"], 0.3);
        assert!(json.get("logs").is_none());
        assert_eq!(json["submittedAt"], "2024-07-20T10:00:00Z");
    }

    #[test]
    fn test_deserialize_rejects_invariant_violations() {
        let completed_without_scores = r#"{
            "id": "sub-2", "userId": "u", "userName": "U", "fileName": "a.zip",
            "submittedAt": "2024-07-19T14:30:00Z", "status": "Completed",
            "evaluationSummary": "missing scores"
        }"#;
        assert!(serde_json::from_str::<Submission>(completed_without_scores).is_err());

        let failed_with_scores = r#"{
            "id": "sub-3", "userId": "u", "userName": "U", "fileName": "a.zip",
            "submittedAt": "2024-07-19T14:30:00Z", "status": "Failed",
            "bleu4Score": 0.1, "customBleuScore": 0.1, "entityCoverageScore": 0.1
        }"#;
        assert!(serde_json::from_str::<Submission>(failed_with_scores).is_err());

        let partial_scores = r#"{
            "id": "sub-4", "userId": "u", "userName": "U", "fileName": "a.zip",
            "submittedAt": "2024-07-19T14:30:00Z", "status": "Completed",
            "bleu4Score": 0.1, "evaluationSummary": "partial"
        }"#;
        assert!(serde_json::from_str::<Submission>(partial_scores).is_err());

        let unknown_status = r#"{
            "id": "sub-5", "userId": "u", "userName": "U", "fileName": "a.zip",
            "submittedAt": "2024-07-19T14:30:00Z", "status": "Queued"
        }"#;
        assert!(serde_json::from_str::<Submission>(unknown_status).is_err());
    }

    #[test]
    fn test_deserialize_failed_record_with_logs() {
        let json = r#"{
            "id": "sub-6", "userId": "u", "userName": "U", "fileName": "final_attempt.zip",
            "submittedAt": "2024-07-18T09:15:00Z", "status": "Failed", "logs": "timeout"
        }"#;
        let failed: Submission = serde_json::from_str(json).unwrap();

        assert_eq!(failed.status, SubmissionStatus::Failed);
        assert_eq!(failed.logs.as_deref(), Some("timeout"));
        assert!(failed.scores.is_none());
    }
}
