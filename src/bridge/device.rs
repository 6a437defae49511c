use std::sync::Arc;

use tracing::{debug, info};

use crate::bridge::{BridgeClient, CommandOutput, argv};
use crate::error::{AutomationError, BridgeError};
use crate::screen::screen_model::Point;

/// A bridge bound to one target device. Cheap to clone; holds no session state
/// beyond the device identifier.
#[derive(Clone)]
pub struct Device {
    bridge: Arc<dyn BridgeClient>,
    device_id: String,
}

impl Device {
    pub fn new(bridge: Arc<dyn BridgeClient>, device_id: impl Into<String>) -> Self {
        Self {
            bridge,
            device_id: device_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.device_id
    }

    pub fn run(&self, argv: &[String]) -> Result<CommandOutput, BridgeError> {
        self.bridge.execute(&self.device_id, argv)
    }

    /// Tap a device-pixel coordinate. Any bridge-level failure is an `ActionError`.
    pub fn tap(&self, point: Point) -> Result<(), AutomationError> {
        let output = self
            .run(&argv([
                "shell",
                "input",
                "tap",
                point.x.to_string().as_str(),
                point.y.to_string().as_str(),
            ]))
            .map_err(|e| AutomationError::Action {
                x: point.x,
                y: point.y,
                reason: e.to_string(),
            })?;

        if !output.success() {
            return Err(AutomationError::Action {
                x: point.x,
                y: point.y,
                reason: output.failure_reason(),
            });
        }

        info!(device = %self.device_id, x = point.x, y = point.y, "tap");
        Ok(())
    }

    pub fn swipe(&self, from: Point, to: Point, duration_ms: u64) -> Result<(), AutomationError> {
        let output = self.run(&argv([
            "shell".to_string(),
            "input".to_string(),
            "swipe".to_string(),
            from.x.to_string(),
            from.y.to_string(),
            to.x.to_string(),
            to.y.to_string(),
            duration_ms.to_string(),
        ]))?;

        if !output.success() {
            return Err(AutomationError::Action {
                x: from.x,
                y: from.y,
                reason: format!("swipe failed: {}", output.failure_reason()),
            });
        }

        debug!(device = %self.device_id, %from, %to, duration_ms, "swipe");
        Ok(())
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}
