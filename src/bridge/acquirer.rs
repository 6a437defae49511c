use std::cell::Cell;

use tracing::{debug, warn};

use crate::bridge::argv;
use crate::bridge::device::Device;
use crate::config::EngineConfig;
use crate::error::AutomationError;
use crate::screen::indexer::index;
use crate::screen::screen_model::Snapshot;

/// Materializes the UI tree on the device and reads it back.
///
/// Captures are never retried here; callers that need idempotent
/// re-snapshotting (verification polls) own that policy.
#[derive(Debug)]
pub struct SnapshotAcquirer {
    device: Device,
    remote_path: String,
    min_bytes: usize,
    captured: Cell<u64>,
}

impl SnapshotAcquirer {
    pub fn new(device: Device, config: &EngineConfig) -> Self {
        Self {
            device,
            remote_path: config.remote_dump_path(),
            min_bytes: config.min_dump_bytes,
            captured: Cell::new(0),
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Number of successful captures so far.
    pub fn captured(&self) -> u64 {
        self.captured.get()
    }

    pub fn capture(&self) -> Result<Snapshot, AutomationError> {
        let raw = self.capture_raw()?;
        let sequence = self.captured.get() + 1;
        let snapshot = index(&raw)?.with_sequence(sequence);
        self.captured.set(sequence);

        debug!(
            sequence,
            elements = snapshot.len(),
            fingerprint = %&snapshot.fingerprint()[..12],
            "captured snapshot"
        );
        Ok(snapshot)
    }

    /// Dump and read back, returning the serialized tree unparsed.
    pub fn capture_raw(&self) -> Result<String, AutomationError> {
        let dump = self
            .device
            .run(&argv(["shell", "uiautomator", "dump", self.remote_path.as_str()]))
            .map_err(|e| AutomationError::acquisition("dump", e.to_string()))?;

        if !dump.success() {
            return Err(AutomationError::acquisition("dump", dump.failure_reason()));
        }
        // uiautomator reports idle-state failures on stdout with a zero exit code
        if dump.stdout.contains("ERROR") {
            return Err(AutomationError::acquisition("dump", dump.stdout.trim()));
        }

        let read = self
            .device
            .run(&argv(["shell", "cat", self.remote_path.as_str()]))
            .map_err(|e| AutomationError::acquisition("read", e.to_string()))?;

        if !read.success() {
            return Err(AutomationError::acquisition("read", read.failure_reason()));
        }

        let payload = read.stdout;
        if payload.trim().len() < self.min_bytes {
            warn!(
                bytes = payload.len(),
                min = self.min_bytes,
                "UI dump implausibly short"
            );
            return Err(AutomationError::acquisition(
                "read",
                format!(
                    "payload is {} bytes, below the {} byte minimum",
                    payload.trim().len(),
                    self.min_bytes
                ),
            ));
        }

        Ok(payload)
    }
}
