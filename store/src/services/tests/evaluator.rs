//! Tests for SimulatedEvaluator

use chrono::Utc;
use std::path::PathBuf;

use shared::Submission;
use crate::services::evaluator::SimulatedEvaluator;
use crate::traits::Evaluator;
use crate::types::{EvaluationOutcome, StoredArtifact};

fn fixture() -> (Submission, StoredArtifact) {
    let submission = Submission::processing("sub-1", "u1", "Ada", "model.zip", Utc::now());
    let artifact = StoredArtifact {
        path: PathBuf::from("uploads/sub-1.zip"),
        size: 2048,
    };
    (submission, artifact)
}

#[tokio::test]
async fn test_always_succeeds_at_full_rate() {
    let evaluator = SimulatedEvaluator::new(0, 0, 1.0);
    let (submission, artifact) = fixture();

    for _ in 0..20 {
        match evaluator.evaluate(&submission, &artifact).await {
            EvaluationOutcome::Completed { scores, summary, logs } => {
                assert!(scores.validate().is_ok());
                assert!(!summary.is_empty());
                assert!(logs.unwrap().contains("model.zip"));
            }
            other => panic!("Expected completion, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_always_fails_at_zero_rate() {
    let evaluator = SimulatedEvaluator::new(0, 0, 0.0);
    let (submission, artifact) = fixture();

    let outcome = evaluator.evaluate(&submission, &artifact).await;
    match outcome {
        EvaluationOutcome::Failed { logs } => assert!(logs.unwrap().contains("timed out")),
        other => panic!("Expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_outcome_applies_to_submission() {
    let evaluator = SimulatedEvaluator::new(1, 5, 1.0);
    let (submission, artifact) = fixture();

    let outcome = evaluator.evaluate(&submission, &artifact).await;
    assert!(outcome.is_success());
    if let EvaluationOutcome::Completed { scores, summary, logs } = outcome {
        let done = submission.complete(scores, summary, logs).unwrap();
        assert!(done.is_terminal());
    }
}

#[test]
fn test_out_of_range_settings_are_clamped() {
    // Must not panic when drawing
    let evaluator = SimulatedEvaluator::new(10, 5, 3.0);
    let (submission, artifact) = fixture();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    let outcome = runtime.block_on(evaluator.evaluate(&submission, &artifact));
    assert!(outcome.is_success());
}
