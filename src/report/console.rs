use crate::{agent::application::ApplicationReport, report::report_model::ScriptSuiteReport};

/// Format a script suite report for the terminal.
///
/// ```text
/// === Scripts: cookie.yaml ===
///
/// ✓ PASS  hide cookie banner (4 steps, 2 assertions)
/// ✗ FAIL  hide promos (6 steps, 3 assertions)
///     [FAIL] Step 5: StoredCount: 1 elements stored but expected 2
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &ScriptSuiteReport) -> String {
    let mut out = format!("=== Scripts: {} ===\n\n", report.suite_name);

    for result in &report.script_results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };
        out.push_str(&format!(
            "{}  {} ({} steps, {} assertions)\n",
            marker,
            result.script_name,
            result.steps_run,
            result.assertion_results.len()
        ));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        for ar in result.assertion_results.iter().filter(|ar| !ar.passed) {
            out.push_str(&format!(
                "    [FAIL] Step {}: {}: {}\n",
                ar.step_index,
                ar.spec.kind(),
                ar.message.as_deref().unwrap_or("assertion failed")
            ));
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));
    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }
    out.push_str(" ===\n");
    out
}

/// Summary of an application pass, one line per stored element.
pub fn format_application_report(report: &ApplicationReport) -> String {
    if report.disabled {
        return format!("{}: disabled, nothing hidden\n", report.host);
    }

    let mut out = format!(
        "{}: {} stored, {} hidden\n",
        report.host,
        report.applied.len(),
        report.hidden_count()
    );
    for applied in &report.applied {
        let tier = match applied.tier {
            Some(tier) => format!("{:?}", tier),
            None => "miss".to_string(),
        };
        out.push_str(&format!("  {:<8} {:>3}  {}\n", tier, applied.matched, applied.key));
    }
    out
}
