use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::action::executor::{ActionOutcome, PostCondition, VerifiedActionExecutor};
use crate::config::EngineConfig;
use crate::error::AutomationError;
use crate::screen::locator::find_exact;
use crate::screen::screen_model::Snapshot;

/// "Toggle the first N controls still showing `initial_label`."
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSpec {
    pub initial_label: String,
    pub final_label: String,
    pub max_attempts: usize,
    /// Minimum verified/attempted fraction for the batch to succeed
    pub threshold: f64,
    pub max_wait: Duration,
}

impl BatchSpec {
    /// Follow-button batch using the configured labels, threshold and window.
    pub fn follow(config: &EngineConfig, max_attempts: usize) -> Self {
        Self {
            initial_label: config.vocabulary.follow_label.clone(),
            final_label: config.vocabulary.followed_label.clone(),
            max_attempts,
            threshold: config.batch_threshold,
            max_wait: config.max_wait(),
        }
    }
}

/// Partial-success report for a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub verified: usize,
    pub threshold: f64,
    pub outcomes: Vec<ActionOutcome>,
}

impl BatchOutcome {
    pub fn from_outcomes(outcomes: Vec<ActionOutcome>, threshold: f64) -> Self {
        let attempted = outcomes.iter().filter(|o| o.attempted).count();
        let verified = outcomes.iter().filter(|o| o.attempted && o.verified).count();
        Self {
            attempted,
            verified,
            threshold,
            outcomes,
        }
    }

    /// Verified fraction of attempted items; 1.0 when nothing was attempted.
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            1.0
        } else {
            self.verified as f64 / self.attempted as f64
        }
    }

    /// Decided by the aggregate fraction only, never by a single item.
    pub fn is_success(&self) -> bool {
        self.success_rate() >= self.threshold
    }
}

impl VerifiedActionExecutor {
    /// Tap up to `spec.max_attempts` controls that still show the initial
    /// label, verifying each one flips to the final label.
    ///
    /// Verification misses are recorded and the batch continues; a failed
    /// tap aborts it.
    pub fn perform_batch(
        &self,
        snapshot: &Snapshot,
        spec: &BatchSpec,
    ) -> Result<BatchOutcome, AutomationError> {
        let candidates = find_exact(snapshot, &[spec.initial_label.as_str()], true);
        let total = candidates.len().min(spec.max_attempts);
        let post = PostCondition::toggle(&spec.initial_label, &spec.final_label, self.tolerance());

        info!(
            candidates = candidates.len(),
            attempts = total,
            "starting batch"
        );

        let mut outcomes = Vec::with_capacity(total);
        for (i, candidate) in candidates.iter().take(total).enumerate() {
            let outcome = self.perform_and_verify(candidate.center, &post, spec.max_wait)?;
            info!(
                item = i + 1,
                of = total,
                point = %candidate.center,
                verified = outcome.verified,
                "batch item done"
            );
            outcomes.push(outcome);

            if i + 1 < total {
                self.clock().sleep(self.batch_interval());
            }
        }

        let batch = BatchOutcome::from_outcomes(outcomes, spec.threshold);
        info!(
            attempted = batch.attempted,
            verified = batch.verified,
            rate = batch.success_rate(),
            success = batch.is_success(),
            "batch finished"
        );
        Ok(batch)
    }
}
