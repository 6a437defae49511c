use std::time::Duration;

use thiserror::Error;

/// Failures of a single bridge invocation (process level, before any
/// interpretation of the command's own output).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The bridge executable could not be started
    #[error("failed to spawn {program} (is adb on PATH?): {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command did not finish within the per-call timeout and was killed
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Waiting on or reading from the child process failed
    #[error("i/o error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Snapshot capture or read-back failed, or the payload was implausibly short.
    /// Fatal to the current step; a stale snapshot must not be substituted.
    #[error("snapshot acquisition failed during {stage}: {reason}")]
    Acquisition { stage: &'static str, reason: String },

    /// The dumped tree was not well-formed markup
    #[error("malformed UI tree at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// The tap command itself failed at the bridge
    #[error("tap at ({x}, {y}) failed: {reason}")]
    Action { x: i32, y: i32, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AutomationError {
    pub fn acquisition(stage: &'static str, reason: impl Into<String>) -> Self {
        AutomationError::Acquisition {
            stage,
            reason: reason.into(),
        }
    }

    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        AutomationError::Parse {
            position,
            message: message.into(),
        }
    }

    /// Errors that a polling caller may treat as one failed observation
    /// rather than a reason to abort.
    pub fn is_transient_capture(&self) -> bool {
        matches!(
            self,
            AutomationError::Acquisition { .. } | AutomationError::Parse { .. }
        )
    }
}
