//! Formatting and reporting for health check results

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::CheckStatus;
use super::runner::HealthCheckReport;

/// Formats a health check report as a table followed by a summary
///
/// With `verbose`, details of passing checks are listed too.
pub fn format_report(report: &HealthCheckReport, verbose: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Check", "Status", "Duration", "Message"]);

    for (name, result) in &report.results {
        builder.push_record([
            name.clone(),
            result.status.as_colored_str(),
            format!("{:.2?}", result.duration),
            result.message.clone(),
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = table.to_string();
    output.push('\n');

    for (name, result) in &report.results {
        if result.details.is_empty() || (!verbose && result.status == CheckStatus::Pass) {
            continue;
        }
        output.push_str(&format!("\n{}\n", name.bold()));
        for line in &result.details {
            output.push_str(&format!("  {}\n", line));
        }
    }

    output.push_str(&format_summary(report));
    output
}

/// Formats the summary section of the report
fn format_summary(report: &HealthCheckReport) -> String {
    let mut summary = format!("\n{}\n", "Summary".bold().underline());
    summary.push_str(&format!("  Total checks: {}\n", report.total));
    summary.push_str(&format!("  {} Passed: {}\n", "✓".green(), report.passed));
    if report.warned > 0 {
        summary.push_str(&format!("  {} Warned: {}\n", "⚠".yellow(), report.warned));
    }
    if report.failed > 0 {
        summary.push_str(&format!("  {} Failed: {}\n", "✗".red(), report.failed));
    }

    let overall = match (report.is_healthy(), report.has_warnings()) {
        (false, _) => "Overall: UNHEALTHY".red().bold(),
        (true, true) => "Overall: HEALTHY (with warnings)".yellow().bold(),
        (true, false) => "Overall: HEALTHY".green().bold(),
    };
    summary.push_str(&format!("\n  {}\n", overall));
    summary
}

/// Prints a health check report to stdout
pub fn print_report(report: &HealthCheckReport, verbose: bool) {
    println!("{}", format_report(report, verbose));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::CheckResult;
    use std::time::Duration;

    fn report(results: Vec<(String, CheckResult)>) -> HealthCheckReport {
        let count = |status| results.iter().filter(|(_, r)| r.status == status).count();
        HealthCheckReport {
            total: results.len(),
            passed: count(CheckStatus::Pass),
            warned: count(CheckStatus::Warn),
            failed: count(CheckStatus::Fail),
            results,
        }
    }

    #[test]
    fn test_warning_details_always_listed() {
        colored::control::set_override(false);
        let report = report(vec![
            (
                "Button Bindings".to_string(),
                CheckResult::warn("1 buttons have more than one use")
                    .with_finding(CheckStatus::Warn, "Escape: cancel, menu")
                    .with_duration(Duration::from_millis(1)),
            ),
            (
                "Scope Stack".to_string(),
                CheckResult::pass("ok").with_finding(CheckStatus::Pass, "create scope 'hud'"),
            ),
        ]);

        let quiet = format_report(&report, false);
        assert!(quiet.contains("Escape: cancel, menu"));
        assert!(!quiet.contains("create scope 'hud'"), "passing details hidden unless verbose");
        assert!(quiet.contains("HEALTHY (with warnings)"));

        let verbose = format_report(&report, true);
        assert!(verbose.contains("create scope 'hud'"));
    }
}
