use crate::workflow::report::WorkflowReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a workflow report for terminal output.
///
/// Produces output like:
/// ```text
/// === Workflow: follow (emulator-5554) ===
///
/// ✓ PASS  reach_message_center [MessageCenter] already there
/// ✗ FAIL  enter_follow_page [MessageCenter] no entry led to FollowRecommendation
/// - SKIP  follow_users
///
/// === Result: FAILED in 12.3s ===
/// ```
pub fn format_console_report(report: &WorkflowReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Workflow: {} ({}) ===\n\n",
        report.workflow, report.device
    ));

    for step in &report.steps {
        let marker = if step.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        out.push_str(&format!("{}  {}", marker, step.name));
        if let Some(page) = step.page {
            out.push_str(&format!(" [{:?}]", page));
        }
        if let Some(ref detail) = step.detail {
            out.push_str(&format!(" {}", detail));
        }
        out.push('\n');
    }

    for name in &report.skipped {
        out.push_str(&format!("- SKIP  {}\n", name));
    }

    if let Some(ref batch) = report.batch {
        out.push_str(&format!(
            "\n    batch: {}/{} verified ({:.1}%, threshold {:.1}%)\n",
            batch.verified,
            batch.attempted,
            batch.success_rate() * 100.0,
            batch.threshold * 100.0
        ));
    }

    if let Some(ref error) = report.error {
        out.push_str(&format!("    [ERROR] {}\n", error));
    }

    let verdict = if report.passed() { "PASSED" } else { "FAILED" };
    out.push_str(&format!("\n=== Result: {}", verdict));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}
