use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "uitree-automation.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "uitree-automation",
    version,
    about = "Verified tap automation over adb and uiautomator UI dumps"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: uitree-automation.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Target device serial (as listed by `adb devices`)
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Path to the adb executable
    #[arg(long, global = true)]
    pub adb: Option<String>,

    /// Append a JSONL action trace to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture the screen and report which page is shown
    Page {
        /// Also list every indexed element
        #[arg(long)]
        elements: bool,
    },

    /// List tappable elements whose text or description contains any of the given strings
    Find {
        /// Candidate text (repeatable)
        #[arg(long = "text", required = true)]
        texts: Vec<String>,

        /// Only clickable elements
        #[arg(long)]
        clickable: bool,
    },

    /// Tap a coordinate and wait for the control there to show a label
    Tap {
        #[arg(long)]
        x: i32,

        #[arg(long)]
        y: i32,

        /// Label the control must show after the tap
        #[arg(long)]
        expect: String,

        /// Text used to find the control again (repeatable; defaults to --expect)
        #[arg(long = "query")]
        query: Vec<String>,

        /// Verification window in seconds (default from config)
        #[arg(long)]
        wait: Option<u64>,
    },

    /// Navigate to follow recommendations and follow the first N users
    Follow {
        /// Maximum users to follow
        #[arg(long, default_value_t = 3)]
        max: usize,

        /// Minimum verified fraction for the batch to pass (default from config)
        #[arg(long)]
        threshold: Option<f64>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `uitree-automation.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Trace file used when `--trace` is not given
    #[serde(default)]
    pub trace: Option<String>,
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if the file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Resolve the engine config: CLI flags > config file > defaults.
pub fn build_engine_config(cli: &Cli, file: &AppConfig) -> EngineConfig {
    let mut config = file.engine.clone();
    if let Some(device) = &cli.device {
        config.device_id = device.clone();
    }
    if let Some(adb) = &cli.adb {
        config.adb_path = adb.clone();
    }
    config
}

/// Resolve the trace file: CLI flag > config file > none.
pub fn resolve_trace_path(cli: &Cli, file: &AppConfig) -> Option<String> {
    cli.trace.clone().or_else(|| file.trace.clone())
}
