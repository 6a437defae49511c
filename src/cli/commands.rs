use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::action::executor::{PostCondition, VerifiedActionExecutor};
use crate::bridge::acquirer::SnapshotAcquirer;
use crate::bridge::adb::AdbBridge;
use crate::bridge::device::Device;
use crate::config::EngineConfig;
use crate::screen::locator::{LocatorQuery, find};
use crate::screen::screen_model::Point;
use crate::trace::logger::TraceLogger;
use crate::workflow::console::format_console_report;
use crate::workflow::runner::FollowWorkflow;

/// Wire the adb bridge, acquirer and executor for one run.
pub fn build_executor(
    config: &EngineConfig,
    trace_path: Option<&str>,
) -> Result<VerifiedActionExecutor, Box<dyn std::error::Error>> {
    config.validate()?;

    let bridge = AdbBridge::new(config.adb_path.clone(), config.command_timeout());
    let device = Device::new(Arc::new(bridge), config.device_id.clone());
    let acquirer = SnapshotAcquirer::new(device, config);

    let tracer = match trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    Ok(VerifiedActionExecutor::new(acquirer, config).with_tracer(tracer))
}

// ============================================================================
// page subcommand
// ============================================================================

pub fn cmd_page(
    executor: &VerifiedActionExecutor,
    show_elements: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (snapshot, page) = executor.observe()?;
    let rule = executor
        .classifier()
        .matching_rule(&snapshot)
        .map(|r| r.name)
        .unwrap_or("none");

    println!("{:?} (rule: {}, {} elements)", page, rule, snapshot.len());

    if show_elements {
        for (i, el) in snapshot.elements().iter().enumerate() {
            let center = el
                .center()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>4} {:<10} {:<6} {:<40} {}",
                i,
                center,
                if el.clickable { "click" } else { "" },
                el.label(),
                el.resource_id
            );
        }
    }

    Ok(())
}

// ============================================================================
// find subcommand
// ============================================================================

pub fn cmd_find(
    executor: &VerifiedActionExecutor,
    texts: &[String],
    clickable: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (snapshot, _) = executor.observe()?;
    let mut query = LocatorQuery::new(texts.iter().cloned()).with_case_fallback();
    if clickable {
        query = query.clickable();
    }

    let matches = find(&snapshot, &query);
    if matches.is_empty() {
        println!("No matches for {:?}", texts);
        return Ok(());
    }

    println!("{} match(es):", matches.len());
    for m in &matches {
        println!(
            "  {} '{}' {}{}",
            m.center,
            m.element.label(),
            m.element.class_name,
            if m.element.clickable { " [clickable]" } else { "" }
        );
    }
    Ok(())
}

// ============================================================================
// tap subcommand
// ============================================================================

/// Tap and verify; returns whether the post-condition was observed.
pub fn cmd_tap(
    executor: &VerifiedActionExecutor,
    config: &EngineConfig,
    point: Point,
    expect: &str,
    query: &[String],
    wait_secs: Option<u64>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let candidates = if query.is_empty() {
        vec![expect.to_string()]
    } else {
        query.to_vec()
    };
    let post = PostCondition {
        query: LocatorQuery::new(candidates),
        expected_label: expect.to_string(),
        tolerance: config.spatial_tolerance_px,
    };
    let max_wait = wait_secs.map(Duration::from_secs).unwrap_or(config.max_wait());

    let outcome = executor.perform_and_verify(point, &post, max_wait)?;
    let seen = outcome
        .final_state
        .as_ref()
        .map(|el| el.label().to_string())
        .unwrap_or_else(|| "<not found>".to_string());

    println!(
        "{} after {} poll(s); control now reads '{}'",
        if outcome.verified { "Verified" } else { "Not verified" },
        outcome.polls,
        seen
    );
    Ok(outcome.verified)
}

// ============================================================================
// follow subcommand
// ============================================================================

/// Run the follow workflow and return whether it passed.
pub fn cmd_follow(
    executor: &VerifiedActionExecutor,
    config: &EngineConfig,
    max: usize,
    threshold: Option<f64>,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut workflow = FollowWorkflow::new(executor, config, max);
    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!("--threshold must be within 0.0..=1.0, got {threshold}").into());
        }
        workflow = workflow.with_threshold(threshold);
    }

    if verbose > 0 {
        eprintln!("Following up to {} users on {}...", max, config.device_id);
    }
    info!(device = %config.device_id, max, "follow workflow started");

    let report = workflow.run();
    print!("{}", format_console_report(&report));
    Ok(report.passed())
}
