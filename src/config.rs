use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;

// ============================================================================
// Engine configuration
// ============================================================================

/// Everything the engine components need, threaded in at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target device serial passed to `adb -s`
    #[serde(default)]
    pub device_id: String,

    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// On-device directory the UI dump is written to
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    #[serde(default = "default_dump_file")]
    pub dump_file: String,

    /// Per bridge call; the child is killed when it elapses
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Payloads shorter than this are treated as a corrupt capture
    #[serde(default = "default_min_dump_bytes")]
    pub min_dump_bytes: usize,

    /// Pause between a tap and the first verification poll
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// Half-width of the window used to re-identify a control after re-render
    #[serde(default = "default_tolerance")]
    pub spatial_tolerance_px: i32,

    /// Pause between consecutive items of a batch
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// Minimum verified/attempted fraction for a batch to count as successful
    #[serde(default = "default_batch_threshold")]
    pub batch_threshold: f64,

    /// Swipes attempted on the follow page when no candidates are visible
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    #[serde(default)]
    pub vocabulary: PageVocabulary,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            adb_path: default_adb_path(),
            remote_dir: default_remote_dir(),
            dump_file: default_dump_file(),
            command_timeout_ms: default_command_timeout_ms(),
            min_dump_bytes: default_min_dump_bytes(),
            settle_ms: default_settle_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
            spatial_tolerance_px: default_tolerance(),
            batch_interval_ms: default_batch_interval_ms(),
            batch_threshold: default_batch_threshold(),
            max_scrolls: default_max_scrolls(),
            vocabulary: PageVocabulary::default(),
        }
    }
}

impl EngineConfig {
    pub fn remote_dump_path(&self) -> String {
        format!("{}/{}", self.remote_dir.trim_end_matches('/'), self.dump_file)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    /// Reject values that would make the engine misbehave silently.
    pub fn validate(&self) -> Result<(), AutomationError> {
        if self.device_id.trim().is_empty() {
            return Err(AutomationError::Config(
                "device_id is empty (pass --device or set it in the config file)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.batch_threshold) {
            return Err(AutomationError::Config(format!(
                "batch_threshold must be within 0.0..=1.0, got {}",
                self.batch_threshold
            )));
        }
        if self.spatial_tolerance_px < 0 {
            return Err(AutomationError::Config(format!(
                "spatial_tolerance_px must not be negative, got {}",
                self.spatial_tolerance_px
            )));
        }
        if self.vocabulary.min_toggle_buttons == 0 {
            return Err(AutomationError::Config(
                "vocabulary.min_toggle_buttons must be at least 1".into(),
            ));
        }
        if self.vocabulary.permission_min_matches == 0 {
            return Err(AutomationError::Config(
                "vocabulary.permission_min_matches must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Page vocabulary (classifier + workflow labels)
// ============================================================================

/// Label sets the classifier and the follow workflow look for. The target
/// application is third-party, so these are data rather than code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVocabulary {
    /// Label of a not-yet-toggled follow button
    #[serde(default = "default_follow_label")]
    pub follow_label: String,

    /// Label the same button shows once the follow took effect
    #[serde(default = "default_followed_label")]
    pub followed_label: String,

    #[serde(default = "default_two")]
    pub min_toggle_buttons: usize,

    #[serde(default = "default_message_sections")]
    pub message_sections: Vec<String>,

    #[serde(default = "default_home_navigation")]
    pub home_navigation: Vec<String>,

    #[serde(default = "default_messaging_entry")]
    pub messaging_entry: Vec<String>,

    /// Wider net used when the current page could not be classified
    #[serde(default = "default_messaging_entry_fallback")]
    pub messaging_entry_fallback: Vec<String>,

    #[serde(default = "default_follow_entry")]
    pub follow_entry: Vec<String>,

    #[serde(default = "default_permission_indicators")]
    pub permission_indicators: Vec<String>,

    /// How many distinct indicators must be present
    #[serde(default = "default_two")]
    pub permission_min_matches: usize,

    #[serde(default = "default_permission_accept")]
    pub permission_accept: Vec<String>,
}

impl Default for PageVocabulary {
    fn default() -> Self {
        Self {
            follow_label: default_follow_label(),
            followed_label: default_followed_label(),
            min_toggle_buttons: default_two(),
            message_sections: default_message_sections(),
            home_navigation: default_home_navigation(),
            messaging_entry: default_messaging_entry(),
            messaging_entry_fallback: default_messaging_entry_fallback(),
            follow_entry: default_follow_entry(),
            permission_indicators: default_permission_indicators(),
            permission_min_matches: default_two(),
            permission_accept: default_permission_accept(),
        }
    }
}

// Serde default helpers
fn default_adb_path() -> String { "adb".to_string() }
fn default_remote_dir() -> String { "/sdcard".to_string() }
fn default_dump_file() -> String { "ui_dump.xml".to_string() }
fn default_command_timeout_ms() -> u64 { 15_000 }
fn default_min_dump_bytes() -> usize { 100 }
fn default_settle_ms() -> u64 { 1_500 }
fn default_poll_interval_ms() -> u64 { 1_000 }
fn default_max_wait_secs() -> u64 { 10 }
fn default_tolerance() -> i32 { 50 }
fn default_batch_interval_ms() -> u64 { 2_000 }
fn default_batch_threshold() -> f64 { 0.5 }
fn default_max_scrolls() -> usize { 3 }
fn default_two() -> usize { 2 }
fn default_follow_label() -> String { "关注".to_string() }
fn default_followed_label() -> String { "已关注".to_string() }

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_message_sections() -> Vec<String> { strings(&["新增关注", "通知", "赞和收藏"]) }
fn default_home_navigation() -> Vec<String> { strings(&["推荐", "关注", "发现"]) }
fn default_messaging_entry() -> Vec<String> { strings(&["消息"]) }
fn default_messaging_entry_fallback() -> Vec<String> { strings(&["消息", "Message", "聊天"]) }
fn default_follow_entry() -> Vec<String> { strings(&["新增关注", "新关注", "关注推荐"]) }
fn default_permission_indicators() -> Vec<String> {
    strings(&["允许", "Allow", "权限", "Permission", "授权"])
}
fn default_permission_accept() -> Vec<String> { strings(&["允许", "Allow", "同意", "确定", "OK"]) }
