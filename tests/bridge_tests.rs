use std::time::Duration;

use uitree_automation::bridge::adb::AdbBridge;
use uitree_automation::{BridgeClient, BridgeError, CommandOutput};

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[test]
fn command_output_reports_best_failure_reason() {
    assert!(CommandOutput::ok("done").success());
    assert_eq!(CommandOutput::failed(1, "  device offline\n").failure_reason(), "device offline");

    let stdout_only = CommandOutput {
        exit_code: Some(1),
        stdout: "ERROR: could not get idle state.".to_string(),
        stderr: String::new(),
    };
    assert_eq!(stdout_only.failure_reason(), "ERROR: could not get idle state.");

    let killed = CommandOutput {
        exit_code: None,
        ..CommandOutput::default()
    };
    assert!(!killed.success());
    assert_eq!(killed.failure_reason(), "terminated by signal");
}

#[test]
fn missing_bridge_executable_is_a_spawn_error() {
    let bridge = AdbBridge::new("/nonexistent/platform-tools/adb", Duration::from_secs(1));
    let err = bridge
        .execute("emulator-5554", &args(&["shell", "input", "tap", "1", "1"]))
        .unwrap_err();
    assert!(matches!(err, BridgeError::Spawn { .. }), "got {err:?}");
}

#[cfg(unix)]
#[test]
fn fake_adb_round_trip_failure_and_timeout() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("adb");
    std::fs::write(
        &script,
        "#!/bin/sh\ncase \"$3\" in\n  fail) echo boom >&2; exit 3 ;;\n  hang) sleep 5 ;;\nesac\necho \"$@\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let bridge = AdbBridge::new(script.to_string_lossy(), Duration::from_millis(300));

    let out = bridge
        .execute("emulator-5554", &args(&["shell", "cat", "/sdcard/ui_dump.xml"]))
        .unwrap();
    assert!(out.success());
    assert_eq!(out.stdout.trim(), "-s emulator-5554 shell cat /sdcard/ui_dump.xml");

    let out = bridge.execute("emulator-5554", &args(&["fail"])).unwrap();
    assert_eq!(out.exit_code, Some(3));
    assert_eq!(out.failure_reason(), "boom");

    let err = bridge.execute("emulator-5554", &args(&["hang"])).unwrap_err();
    match err {
        BridgeError::Timeout { timeout, .. } => assert_eq!(timeout, Duration::from_millis(300)),
        other => panic!("expected timeout, got {other:?}"),
    }
}
