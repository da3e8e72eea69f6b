//! Simulated evaluation backend
//!
//! Stands in for the sandboxed runner: waits a random delay, then either
//! completes with random metric values or fails with execution logs. The real
//! runner would execute `python predict.py --input /app/input --output
//! /app/output` and score the output.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use shared::{ProcessId, Scores, StoreConfig, Submission, process_debug};
use crate::traits::Evaluator;
use crate::types::{EvaluationOutcome, StoredArtifact};

/// Random-delay, random-outcome evaluator
#[derive(Debug, Clone)]
pub struct SimulatedEvaluator {
    min_delay_ms: u64,
    max_delay_ms: u64,
    success_rate: f64,
}

impl SimulatedEvaluator {
    pub fn new(min_delay_ms: u64, max_delay_ms: u64, success_rate: f64) -> Self {
        Self {
            min_delay_ms: min_delay_ms.min(max_delay_ms),
            max_delay_ms,
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            config.min_evaluation_delay_ms,
            config.max_evaluation_delay_ms,
            config.success_rate,
        )
    }

    /// Draw the delay and outcome up front; the thread RNG must not live across an await
    fn draw(&self, submission: &Submission, artifact: &StoredArtifact) -> (Duration, EvaluationOutcome) {
        let mut rng = rand::thread_rng();
        let delay = Duration::from_millis(rng.gen_range(self.min_delay_ms..=self.max_delay_ms));

        let outcome = if rng.gen_bool(self.success_rate) {
            let bleu4 = rng.gen_range(0.5..0.9);
            let custom_bleu = rng.gen_range(0.45..0.85);
            let coverage = rng.gen_range(0.55..0.95);
            match Scores::new(bleu4, custom_bleu, coverage) {
                Ok(scores) => EvaluationOutcome::Completed {
                    scores,
                    summary: "Evaluation finished. Check scores and logs.".to_string(),
                    logs: Some(format!(
                        "Extracted {} ({} bytes)\nRunning predict.py...\nScoring outputs...\nDone.",
                        submission.file_name, artifact.size
                    )),
                },
                Err(e) => EvaluationOutcome::Failed {
                    logs: Some(format!("Scoring error: {e}")),
                },
            }
        } else {
            EvaluationOutcome::Failed {
                logs: Some(format!(
                    "Extracted {} ({} bytes)\nRunning predict.py...\nExecution timed out.",
                    submission.file_name, artifact.size
                )),
            }
        };

        (delay, outcome)
    }
}

impl Default for SimulatedEvaluator {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

#[async_trait]
impl Evaluator for SimulatedEvaluator {
    async fn evaluate(&self, submission: &Submission, artifact: &StoredArtifact) -> EvaluationOutcome {
        let (delay, outcome) = self.draw(submission, artifact);
        process_debug!(
            ProcessId::current(),
            "⏳ Evaluating {} for {:?}",
            submission.id,
            delay
        );
        tokio::time::sleep(delay).await;
        outcome
    }
}
