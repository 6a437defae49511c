use std::cell::Cell;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::action::clock::{Clock, SystemClock};
use crate::bridge::acquirer::SnapshotAcquirer;
use crate::bridge::device::Device;
use crate::config::EngineConfig;
use crate::error::AutomationError;
use crate::screen::classifier::{PageClassifier, PageState};
use crate::screen::locator::{LocatorQuery, near};
use crate::screen::screen_model::{Point, Snapshot, UiElement};
use crate::state::normalize::label_equals;
use crate::trace::{logger::TraceLogger, trace::TraceEvent};

/// Floor for the poll interval so a zero setting cannot spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What must be observed after a tap for it to count as effective.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCondition {
    /// Query that finds the control in a fresh snapshot (before or after state)
    pub query: LocatorQuery,
    /// Visible text the re-identified control must show
    pub expected_label: String,
    /// Spatial window used to re-identify the control
    pub tolerance: i32,
}

impl PostCondition {
    /// Toggle-button condition: the control reads `from` or `to`, and must read `to`.
    pub fn toggle(from: &str, to: &str, tolerance: i32) -> Self {
        Self {
            query: LocatorQuery::new([from, to]),
            expected_label: to.to_string(),
            tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub attempted: bool,
    pub verified: bool,
    /// Last observation of the re-identified control, if it was ever seen
    pub final_state: Option<UiElement>,
    pub polls: u32,
}

impl ActionOutcome {
    pub fn not_attempted() -> Self {
        Self {
            attempted: false,
            verified: false,
            final_state: None,
            polls: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationOutcome {
    pub attempted: bool,
    pub verified: bool,
    /// Classification of the last successful poll
    pub page: PageState,
    pub polls: u32,
}

/// Result of one verification window.
#[derive(Debug)]
struct PollResult<T> {
    satisfied: bool,
    observed: Option<T>,
    polls: u32,
    fingerprint: Option<String>,
}

/// Taps a resolved coordinate and confirms the effect by re-observing the UI.
///
/// Strictly sequential: a capture never overlaps a tap and polls never
/// overlap one another. Once a tap is issued the full verification window is
/// waited out before an outcome is reported.
pub struct VerifiedActionExecutor {
    acquirer: SnapshotAcquirer,
    classifier: PageClassifier,
    clock: Box<dyn Clock>,
    tracer: TraceLogger,
    settle: Duration,
    poll_interval: Duration,
    tolerance: i32,
    batch_interval: Duration,
    step: Cell<u64>,
}

impl VerifiedActionExecutor {
    pub fn new(acquirer: SnapshotAcquirer, config: &EngineConfig) -> Self {
        Self {
            acquirer,
            classifier: PageClassifier::new(&config.vocabulary),
            clock: Box::new(SystemClock::new()),
            tracer: TraceLogger::disabled(),
            settle: config.settle(),
            poll_interval: config.poll_interval(),
            tolerance: config.spatial_tolerance_px,
            batch_interval: config.batch_interval(),
            step: Cell::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn with_classifier(mut self, classifier: PageClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn device(&self) -> &Device {
        self.acquirer.device()
    }

    pub fn classifier(&self) -> &PageClassifier {
        &self.classifier
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    pub fn batch_interval(&self) -> Duration {
        self.batch_interval
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Fresh snapshot plus its classification.
    pub fn observe(&self) -> Result<(Snapshot, PageState), AutomationError> {
        let snapshot = self.acquirer.capture()?;
        let page = self.classifier.classify(&snapshot);
        debug!(sequence = snapshot.sequence(), ?page, "observed page");
        Ok((snapshot, page))
    }

    /// Tap `point`, then poll until the control re-identified near `point`
    /// reads `post.expected_label`, or `max_wait` elapses.
    ///
    /// A failed tap is an error. A post-condition that never appears is not:
    /// it is reported as `verified == false`.
    pub fn perform_and_verify(
        &self,
        point: Point,
        post: &PostCondition,
        max_wait: Duration,
    ) -> Result<ActionOutcome, AutomationError> {
        let step = self.next_step();
        self.device().tap(point)?;
        self.clock.sleep(self.settle);

        let result = self.poll_until(max_wait, |snapshot| {
            let control = near(snapshot, &post.query, point, post.tolerance).map(|m| m.element);
            let done = control
                .as_ref()
                .is_some_and(|el| label_equals(el, &post.expected_label));
            (done, control)
        })?;

        if result.satisfied {
            info!(%point, polls = result.polls, label = %post.expected_label, "action verified");
        } else {
            warn!(
                %point,
                polls = result.polls,
                expected = %post.expected_label,
                seen = result.observed.as_ref().map(|el| el.text.as_str()).unwrap_or("<none>"),
                "verification timed out"
            );
        }

        self.tracer.log(
            &TraceEvent::now(step, "tap_verify")
                .with_point(point)
                .with_verification(result.satisfied, result.polls)
                .with_fingerprint(result.fingerprint.as_deref())
                .with_detail(&post.expected_label),
        );

        Ok(ActionOutcome {
            attempted: true,
            verified: result.satisfied,
            final_state: result.observed,
            polls: result.polls,
        })
    }

    /// Tap `point`, then poll until the classifier reports one of `expected`.
    pub fn tap_until_page(
        &self,
        point: Point,
        expected: &[PageState],
        max_wait: Duration,
    ) -> Result<NavigationOutcome, AutomationError> {
        let step = self.next_step();
        self.device().tap(point)?;
        self.clock.sleep(self.settle);

        let result = self.poll_until(max_wait, |snapshot| {
            let page = self.classifier.classify(snapshot);
            (expected.contains(&page), Some(page))
        })?;

        let page = result.observed.unwrap_or(PageState::Unknown);
        if result.satisfied {
            info!(%point, ?page, polls = result.polls, "navigation verified");
        } else {
            warn!(%point, ?page, ?expected, polls = result.polls, "navigation not confirmed");
        }

        self.tracer.log(
            &TraceEvent::now(step, "navigate")
                .with_point(point)
                .with_page(page)
                .with_verification(result.satisfied, result.polls)
                .with_fingerprint(result.fingerprint.as_deref()),
        );

        Ok(NavigationOutcome {
            attempted: true,
            verified: result.satisfied,
            page,
            polls: result.polls,
        })
    }

    /// Poll fresh snapshots until `check` is satisfied or the window closes.
    ///
    /// `check` returns whether the condition holds plus whatever it observed;
    /// the latest non-empty observation is kept. Captures that fail or come
    /// back malformed count as a spent poll rather than aborting the window.
    fn poll_until<T, F>(&self, max_wait: Duration, mut check: F) -> Result<PollResult<T>, AutomationError>
    where
        F: FnMut(&Snapshot) -> (bool, Option<T>),
    {
        let interval = self.poll_interval.max(MIN_POLL_INTERVAL);
        let deadline = self.clock.now() + max_wait;
        let mut polls = 0u32;
        let mut observed = None;
        let mut fingerprint: Option<String> = None;

        loop {
            polls += 1;
            match self.acquirer.capture() {
                Ok(snapshot) => {
                    if fingerprint.as_deref() == Some(snapshot.fingerprint()) {
                        debug!(poll = polls, "screen unchanged since previous poll");
                    }
                    fingerprint = Some(snapshot.fingerprint().to_string());

                    let (done, seen) = check(&snapshot);
                    if seen.is_some() {
                        observed = seen;
                    }
                    if done {
                        return Ok(PollResult {
                            satisfied: true,
                            observed,
                            polls,
                            fingerprint,
                        });
                    }
                }
                Err(e) if e.is_transient_capture() => {
                    warn!(poll = polls, error = %e, "verification poll could not capture the screen");
                }
                Err(e) => return Err(e),
            }

            if self.clock.now() + interval > deadline {
                break;
            }
            self.clock.sleep(interval);
        }

        Ok(PollResult {
            satisfied: false,
            observed,
            polls,
            fingerprint,
        })
    }

    fn next_step(&self) -> u64 {
        let step = self.step.get();
        self.step.set(step + 1);
        step
    }
}

impl std::fmt::Debug for VerifiedActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedActionExecutor")
            .field("device", self.device())
            .field("settle", &self.settle)
            .field("poll_interval", &self.poll_interval)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}
