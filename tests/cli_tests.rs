use std::io::Write;

use clap::Parser;
use uitree_automation::cli::config::{
    AppConfig, Cli, Commands, build_engine_config, load_config, resolve_trace_path,
};
use uitree_automation::{AutomationError, EngineConfig};

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_page() {
    let cli = Cli::parse_from(["uitree-automation", "page", "-d", "emulator-5554"]);
    assert_eq!(cli.device.as_deref(), Some("emulator-5554"));
    match cli.command {
        Commands::Page { elements } => assert!(!elements),
        _ => panic!("Expected Page command"),
    }
}

#[test]
fn cli_parse_find_repeated_text() {
    let cli = Cli::parse_from([
        "uitree-automation",
        "find",
        "--text",
        "消息",
        "--text",
        "Message",
        "--clickable",
    ]);
    match cli.command {
        Commands::Find { texts, clickable } => {
            assert_eq!(texts, vec!["消息", "Message"]);
            assert!(clickable);
        }
        _ => panic!("Expected Find command"),
    }
}

#[test]
fn cli_find_requires_text() {
    assert!(Cli::try_parse_from(["uitree-automation", "find"]).is_err());
}

#[test]
fn cli_parse_tap() {
    let cli = Cli::parse_from([
        "uitree-automation",
        "tap",
        "--x",
        "940",
        "--y",
        "340",
        "--expect",
        "已关注",
        "--query",
        "关注",
        "--query",
        "已关注",
        "--wait",
        "5",
    ]);
    match cli.command {
        Commands::Tap {
            x,
            y,
            expect,
            query,
            wait,
        } => {
            assert_eq!((x, y), (940, 340));
            assert_eq!(expect, "已关注");
            assert_eq!(query, vec!["关注", "已关注"]);
            assert_eq!(wait, Some(5));
        }
        _ => panic!("Expected Tap command"),
    }
}

#[test]
fn cli_parse_follow_defaults() {
    let cli = Cli::parse_from(["uitree-automation", "follow"]);
    assert_eq!(cli.verbose, 0);
    match cli.command {
        Commands::Follow { max, threshold } => {
            assert_eq!(max, 3);
            assert_eq!(threshold, None);
        }
        _ => panic!("Expected Follow command"),
    }
}

#[test]
fn cli_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "uitree-automation",
        "follow",
        "--max",
        "5",
        "--threshold",
        "0.8",
        "-vv",
        "--adb",
        "/opt/platform-tools/adb",
        "--trace",
        "run.jsonl",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.adb.as_deref(), Some("/opt/platform-tools/adb"));
    assert_eq!(cli.trace.as_deref(), Some("run.jsonl"));
    match cli.command {
        Commands::Follow { max, threshold } => {
            assert_eq!(max, 5);
            assert_eq!(threshold, Some(0.8));
        }
        _ => panic!("Expected Follow command"),
    }
}

// ============================================================================
// Config File Tests
// ============================================================================

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn config_missing_file_uses_defaults() {
    let config = load_config(Some("nonexistent_file_that_does_not_exist.yaml"));
    assert_eq!(config.engine.adb_path, "adb");
    assert_eq!(config.engine.max_wait_secs, 10);
    assert!(config.trace.is_none());
}

#[test]
fn config_default_values() {
    let config = EngineConfig::default();
    assert_eq!(config.remote_dump_path(), "/sdcard/ui_dump.xml");
    assert_eq!(config.spatial_tolerance_px, 50);
    assert_eq!(config.poll_interval_ms, 1_000);
    assert_eq!(config.settle_ms, 1_500);
    assert_eq!(config.min_dump_bytes, 100);
    assert!((config.batch_threshold - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.vocabulary.follow_label, "关注");
    assert_eq!(config.vocabulary.followed_label, "已关注");
    assert_eq!(config.vocabulary.permission_min_matches, 2);
}

#[test]
fn config_partial_yaml_keeps_other_defaults() {
    let file = write_config(
        "engine:\n  device_id: R58M123\n  max_wait_secs: 4\n  vocabulary:\n    permission_min_matches: 3\ntrace: follow.jsonl\n",
    );
    let config = load_config(file.path().to_str());

    assert_eq!(config.engine.device_id, "R58M123");
    assert_eq!(config.engine.max_wait_secs, 4);
    assert_eq!(config.engine.poll_interval_ms, 1_000);
    assert_eq!(config.engine.vocabulary.permission_min_matches, 3);
    assert_eq!(config.engine.vocabulary.follow_label, "关注");
    assert_eq!(config.trace.as_deref(), Some("follow.jsonl"));
}

#[test]
fn config_malformed_yaml_falls_back_to_defaults() {
    let file = write_config("engine: [this is: not a mapping\n");
    let config = load_config(file.path().to_str());
    assert!(config.engine.device_id.is_empty());
    assert_eq!(config.engine.adb_path, "adb");
}

#[test]
fn cli_flags_override_config_file() {
    let file = AppConfig {
        engine: EngineConfig {
            device_id: "from-file".to_string(),
            adb_path: "/usr/bin/adb".to_string(),
            ..EngineConfig::default()
        },
        trace: Some("file.jsonl".to_string()),
    };

    let cli = Cli::parse_from(["uitree-automation", "page", "-d", "from-cli"]);
    let config = build_engine_config(&cli, &file);
    assert_eq!(config.device_id, "from-cli");
    assert_eq!(config.adb_path, "/usr/bin/adb");
    assert_eq!(resolve_trace_path(&cli, &file).as_deref(), Some("file.jsonl"));

    let cli = Cli::parse_from(["uitree-automation", "page", "--trace", "cli.jsonl"]);
    assert_eq!(build_engine_config(&cli, &file).device_id, "from-file");
    assert_eq!(resolve_trace_path(&cli, &file).as_deref(), Some("cli.jsonl"));
}

// ============================================================================
// Validation
// ============================================================================

fn assert_config_error(config: &EngineConfig, needle: &str) {
    match config.validate() {
        Err(AutomationError::Config(msg)) => assert!(msg.contains(needle), "message: {msg}"),
        other => panic!("expected config error mentioning {needle}, got {other:?}"),
    }
}

#[test]
fn validate_rejects_unusable_settings() {
    assert_config_error(&EngineConfig::default(), "device_id");

    let base = EngineConfig {
        device_id: "emulator-5554".to_string(),
        ..EngineConfig::default()
    };
    assert!(base.validate().is_ok());

    assert_config_error(
        &EngineConfig {
            batch_threshold: 1.5,
            ..base.clone()
        },
        "batch_threshold",
    );
    assert_config_error(
        &EngineConfig {
            spatial_tolerance_px: -1,
            ..base.clone()
        },
        "spatial_tolerance_px",
    );

    let mut no_toggle_minimum = base.clone();
    no_toggle_minimum.vocabulary.min_toggle_buttons = 0;
    assert_config_error(&no_toggle_minimum, "min_toggle_buttons");

    let mut no_permission_threshold = base;
    no_permission_threshold.vocabulary.permission_min_matches = 0;
    assert_config_error(&no_permission_threshold, "permission_min_matches");
}
