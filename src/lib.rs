//! Verified tap automation for Android devices driven through `adb`.
//!
//! A run captures `uiautomator` dumps ([`bridge::acquirer`]), indexes them
//! into immutable snapshots ([`screen::indexer`]), finds tap targets
//! ([`screen::locator`]), classifies the page shown ([`screen::classifier`])
//! and confirms every tap by re-observing the screen ([`action::executor`]).

pub mod action;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod screen;
pub mod state;
pub mod trace;
pub mod workflow;

pub use action::batch::{BatchOutcome, BatchSpec};
pub use action::executor::{ActionOutcome, NavigationOutcome, PostCondition, VerifiedActionExecutor};
pub use bridge::{BridgeClient, CommandOutput};
pub use config::{EngineConfig, PageVocabulary};
pub use error::{AutomationError, BridgeError};
pub use screen::classifier::{PageClassifier, PageState};
pub use screen::locator::{LocatorQuery, Match};
pub use screen::screen_model::{Bounds, Point, Snapshot, UiElement};
