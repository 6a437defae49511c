use std::time::Duration;

use tracing::{info, warn};

use crate::action::batch::{BatchOutcome, BatchSpec};
use crate::action::executor::VerifiedActionExecutor;
use crate::config::{EngineConfig, PageVocabulary};
use crate::error::AutomationError;
use crate::screen::classifier::PageState;
use crate::screen::locator::{LocatorQuery, find, find_exact};
use crate::screen::screen_model::{Point, Snapshot};
use crate::workflow::report::{StepResult, WorkflowReport};

pub const STEP_MESSAGE_CENTER: &str = "reach_message_center";
pub const STEP_FOLLOW_PAGE: &str = "enter_follow_page";
pub const STEP_FOLLOW_USERS: &str = "follow_users";

const STEPS: [&str; 3] = [STEP_MESSAGE_CENTER, STEP_FOLLOW_PAGE, STEP_FOLLOW_USERS];

const SWIPE_MS: u64 = 300;

/// What happened when a permission dialog was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    /// Nothing was tapped
    NoAcceptButton,
    /// An accept button was tapped; `cleared` tells whether the dialog was seen gone
    Tapped { cleared: bool },
}

/// Message center → follow recommendations → follow the first N users.
///
/// Never presses back (that exits the target app); every transition is a tap
/// whose effect is confirmed by re-classifying the screen.
pub struct FollowWorkflow<'a> {
    executor: &'a VerifiedActionExecutor,
    vocab: &'a PageVocabulary,
    max_wait: Duration,
    max_scrolls: usize,
    batch: BatchSpec,
}

impl<'a> FollowWorkflow<'a> {
    pub fn new(executor: &'a VerifiedActionExecutor, config: &'a EngineConfig, max_follows: usize) -> Self {
        Self {
            executor,
            vocab: &config.vocabulary,
            max_wait: config.max_wait(),
            max_scrolls: config.max_scrolls,
            batch: BatchSpec::follow(config, max_follows),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.batch.threshold = threshold;
        self
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self) -> WorkflowReport {
        let clock = self.executor.clock();
        let started = clock.now();
        let mut report = WorkflowReport::new("follow", self.executor.device().id());

        for (i, name) in STEPS.iter().enumerate() {
            info!(step = name, "starting workflow step");

            let result = match *name {
                STEP_MESSAGE_CENTER => self.reach_message_center(),
                STEP_FOLLOW_PAGE => self.enter_follow_page(),
                _ => self.follow_users().map(|(step, batch)| {
                    report.batch = Some(batch);
                    step
                }),
            };

            match result {
                Ok(step) => {
                    let passed = step.passed;
                    report.steps.push(step);
                    if !passed {
                        warn!(step = name, "workflow step failed, stopping");
                        report.skipped = STEPS[i + 1..].iter().map(|s| s.to_string()).collect();
                        break;
                    }
                }
                Err(e) => {
                    warn!(step = name, error = %e, "workflow step aborted");
                    report.steps.push(StepResult::fail(name, None, e.to_string()));
                    report.error = Some(format!("{}: {}", name, e));
                    report.skipped = STEPS[i + 1..].iter().map(|s| s.to_string()).collect();
                    break;
                }
            }
        }

        let elapsed = clock.now().saturating_sub(started);
        report.with_duration(elapsed.as_millis())
    }

    /// Step 1: get to the message center (or straight to the follow page).
    pub fn reach_message_center(&self) -> Result<StepResult, AutomationError> {
        let (snapshot, page) = self.observe_settled()?;
        let targets = [PageState::MessageCenter, PageState::FollowRecommendation];

        match page {
            PageState::MessageCenter | PageState::FollowRecommendation => Ok(StepResult::pass(
                STEP_MESSAGE_CENTER,
                page,
                "already there",
            )),
            PageState::Home => self.tap_entries(STEP_MESSAGE_CENTER, &snapshot, &self.vocab.messaging_entry, &targets),
            _ => {
                info!("page not recognized, trying the wider messaging vocabulary");
                self.tap_entries(
                    STEP_MESSAGE_CENTER,
                    &snapshot,
                    &self.vocab.messaging_entry_fallback,
                    &targets,
                )
            }
        }
    }

    /// Step 2: open the follow-recommendation list.
    pub fn enter_follow_page(&self) -> Result<StepResult, AutomationError> {
        let (snapshot, page) = self.observe_settled()?;

        match page {
            PageState::FollowRecommendation => Ok(StepResult::pass(STEP_FOLLOW_PAGE, page, "already there")),
            PageState::MessageCenter | PageState::Home => self.tap_entries(
                STEP_FOLLOW_PAGE,
                &snapshot,
                &self.vocab.follow_entry,
                &[PageState::FollowRecommendation],
            ),
            other => Ok(StepResult::fail(
                STEP_FOLLOW_PAGE,
                Some(other),
                "not on a page that links to follow recommendations",
            )),
        }
    }

    /// Step 3: follow up to N not-yet-followed users, scrolling when none are visible.
    pub fn follow_users(&self) -> Result<(StepResult, BatchOutcome), AutomationError> {
        let (mut snapshot, mut page) = self.observe_settled()?;
        if page != PageState::FollowRecommendation {
            warn!(?page, "follow step started off the follow page");
        }

        let mut scrolls = 0;
        while self.unfollowed_count(&snapshot) == 0 && scrolls < self.max_scrolls {
            scrolls += 1;
            info!(scroll = scrolls, "no unfollowed users visible, scrolling");
            self.scroll_up(&snapshot)?;
            (snapshot, page) = self.observe_settled()?;
        }

        let batch = self.executor.perform_batch(&snapshot, &self.batch)?;
        let detail = if batch.attempted == 0 {
            "no unfollowed users found".to_string()
        } else {
            format!(
                "{}/{} verified ({:.1}%)",
                batch.verified,
                batch.attempted,
                batch.success_rate() * 100.0
            )
        };

        let step = if batch.is_success() {
            StepResult::pass(STEP_FOLLOW_USERS, page, detail)
        } else {
            StepResult::fail(STEP_FOLLOW_USERS, Some(page), format!("{detail}, below threshold"))
        };
        Ok((step, batch))
    }

    /// Observe the screen, first clearing a permission dialog if one is showing.
    ///
    /// Once an accept button was tapped the pre-tap snapshot is stale, so the
    /// screen is always captured again and a failed capture aborts the step.
    fn observe_settled(&self) -> Result<(Snapshot, PageState), AutomationError> {
        let (snapshot, page) = self.executor.observe()?;
        if page != PageState::PermissionDialog {
            return Ok((snapshot, page));
        }

        info!("permission dialog detected");
        match self.dismiss_permission_dialog(&snapshot)? {
            Dismissal::NoAcceptButton => {
                warn!("no accept button found on permission dialog");
                Ok((snapshot, page))
            }
            Dismissal::Tapped { cleared } => {
                if !cleared {
                    warn!("permission dialog not confirmed gone after tapping accept");
                }
                self.executor.observe()
            }
        }
    }

    /// Tap the first accept-style button and wait for the dialog to go away.
    pub fn dismiss_permission_dialog(&self, snapshot: &Snapshot) -> Result<Dismissal, AutomationError> {
        let labels: Vec<&str> = self.vocab.permission_accept.iter().map(String::as_str).collect();
        let Some(button) = find_exact(snapshot, &labels, true).into_iter().next() else {
            return Ok(Dismissal::NoAcceptButton);
        };

        let cleared = [
            PageState::Home,
            PageState::MessageCenter,
            PageState::FollowRecommendation,
            PageState::Unknown,
        ];
        let outcome = self.executor.tap_until_page(button.center, &cleared, self.max_wait)?;
        Ok(Dismissal::Tapped {
            cleared: outcome.verified,
        })
    }

    /// Tap each clickable entry matching `labels` until one lands on a target page.
    fn tap_entries(
        &self,
        step: &str,
        snapshot: &Snapshot,
        labels: &[String],
        targets: &[PageState],
    ) -> Result<StepResult, AutomationError> {
        let entries = find(snapshot, &LocatorQuery::new(labels.iter().cloned()).clickable());
        if entries.is_empty() {
            return Ok(StepResult::fail(step, None, format!("no clickable entry among {:?}", labels)));
        }

        let mut last_page = None;
        for entry in &entries {
            info!(label = entry.element.label(), point = %entry.center, "trying entry");
            let outcome = self.executor.tap_until_page(entry.center, targets, self.max_wait)?;
            if outcome.verified {
                return Ok(StepResult::pass(
                    step,
                    outcome.page,
                    format!("via '{}'", entry.element.label()),
                ));
            }
            last_page = Some(outcome.page);
        }

        Ok(StepResult::fail(
            step,
            last_page,
            format!("no entry led to {:?}", targets),
        ))
    }

    fn unfollowed_count(&self, snapshot: &Snapshot) -> usize {
        find_exact(snapshot, &[self.batch.initial_label.as_str()], true).len()
    }

    fn scroll_up(&self, snapshot: &Snapshot) -> Result<(), AutomationError> {
        let (width, height) = screen_extent(snapshot);
        let from = Point::new(width / 2, fraction(height, 3, 4));
        let to = Point::new(width / 2, fraction(height, 1, 4));
        self.executor.device().swipe(from, to, SWIPE_MS)?;
        self.executor.clock().sleep(self.executor.settle());
        Ok(())
    }
}

/// `value * num / den` without intermediate overflow; `num <= den` keeps it in range.
fn fraction(value: i32, num: i64, den: i64) -> i32 {
    (i64::from(value) * num / den) as i32
}

/// Screen size estimated from the outermost element bounds.
pub fn screen_extent(snapshot: &Snapshot) -> (i32, i32) {
    snapshot
        .elements()
        .iter()
        .filter_map(|el| el.bounds)
        .fold((0, 0), |(w, h), b| (w.max(b.right()), h.max(b.bottom())))
}
