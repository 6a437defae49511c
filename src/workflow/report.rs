use serde::Serialize;

use crate::action::batch::BatchOutcome;
use crate::screen::classifier::PageState;

// ============================================================================
// Workflow report: one StepResult per top-level step
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub name: String,
    pub passed: bool,

    /// Page the step ended on, when it was observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepResult {
    pub fn pass(name: &str, page: PageState, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            page: Some(page),
            detail: Some(detail.into()),
        }
    }

    pub fn fail(name: &str, page: Option<PageState>, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            page,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    pub workflow: String,
    pub device: String,

    pub steps: Vec<StepResult>,

    /// Names of steps that never ran because an earlier one failed
    pub skipped: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchOutcome>,

    /// Fatal error that aborted the run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

impl WorkflowReport {
    pub fn new(workflow: &str, device: &str) -> Self {
        Self {
            workflow: workflow.to_string(),
            device: device.to_string(),
            steps: Vec::new(),
            skipped: Vec::new(),
            batch: None,
            error: None,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Every planned step ran and passed, and nothing aborted the run.
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.skipped.is_empty() && self.steps.iter().all(|s| s.passed)
    }
}
