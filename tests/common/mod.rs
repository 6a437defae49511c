#![allow(dead_code)]

use std::sync::Arc;

use uitree_automation::action::clock::Clock;
use uitree_automation::bridge::acquirer::SnapshotAcquirer;
use uitree_automation::bridge::device::Device;
use uitree_automation::bridge::mock::{ManualClock, ScriptedBridge};
use uitree_automation::{EngineConfig, VerifiedActionExecutor};

pub const DEVICE: &str = "emulator-5554";

/// One `node` element with the attributes uiautomator always emits.
pub fn node(text: &str, desc: &str, clickable: bool, bounds: &str) -> String {
    format!(
        r#"<node index="0" text="{text}" resource-id="" class="android.widget.TextView" package="com.xingin.xhs" content-desc="{desc}" checkable="false" checked="false" clickable="{clickable}" enabled="true" focusable="false" focused="false" scrollable="false" long-clickable="false" password="false" selected="false" bounds="{bounds}" />"#
    )
}

pub fn button(text: &str, bounds: &str) -> String {
    node(text, "", true, bounds)
}

pub fn label(text: &str, bounds: &str) -> String {
    node(text, "", false, bounds)
}

/// Wrap nodes in a full-screen root, the way `uiautomator dump` writes files.
pub fn hierarchy(nodes: &[String]) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation=\"0\">\
<node index=\"0\" text=\"\" resource-id=\"\" class=\"android.widget.FrameLayout\" package=\"com.xingin.xhs\" content-desc=\"\" clickable=\"false\" bounds=\"[0,0][1080,1920]\">{}</node></hierarchy>",
        nodes.concat()
    )
}

/// Follow page with one toggle button per row, 200px apart.
pub fn follow_page(labels: &[&str]) -> String {
    let rows: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let top = 300 + i as i32 * 200;
            button(l, &format!("[850,{}][1030,{}]", top, top + 80))
        })
        .collect();
    hierarchy(&rows)
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        device_id: DEVICE.to_string(),
        ..EngineConfig::default()
    }
}

pub struct Rig {
    pub bridge: Arc<ScriptedBridge>,
    pub executor: VerifiedActionExecutor,
}

/// Executor over a scripted bridge and a virtual clock.
pub fn rig(dumps: Vec<String>, config: &EngineConfig) -> Rig {
    let bridge = Arc::new(ScriptedBridge::new(dumps));
    let device = Device::new(bridge.clone(), DEVICE);
    let acquirer = SnapshotAcquirer::new(device, config);
    let clock: Box<dyn Clock> = Box::new(ManualClock::new());
    let executor = VerifiedActionExecutor::new(acquirer, config).with_clock(clock);
    Rig { bridge, executor }
}
