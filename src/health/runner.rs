//! Runner for orchestrating health checks

use std::time::Instant;

use tracing::{debug, warn};

use super::check::{CheckResult, CheckStatus, SystemCheck};

/// Results from running a health check suite
#[derive(Debug)]
pub struct HealthCheckReport {
    /// Individual check results with their system names
    pub results: Vec<(String, CheckResult)>,
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl HealthCheckReport {
    /// Returns true if no check failed
    pub fn is_healthy(&self) -> bool {
        self.failed == 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warned > 0
    }

    /// Worst status across all checks, `Pass` for an empty report
    pub fn worst_status(&self) -> CheckStatus {
        self.results
            .iter()
            .map(|(_, result)| result.status)
            .max()
            .unwrap_or(CheckStatus::Pass)
    }

    /// Results that warned or failed
    pub fn findings(&self) -> impl Iterator<Item = (&str, &CheckResult)> {
        self.results
            .iter()
            .filter(|(_, result)| result.status != CheckStatus::Pass)
            .map(|(name, result)| (name.as_str(), result))
    }

    /// Returns the appropriate exit code for this report
    /// 0 = all pass, 1 = any fail, 2 = any warn (but no fail)
    pub fn exit_code(&self) -> i32 {
        match self.worst_status() {
            CheckStatus::Pass => 0,
            CheckStatus::Fail => 1,
            CheckStatus::Warn => 2,
        }
    }
}

/// Orchestrates running health checks and collecting results
pub struct HealthCheckRunner {
    checks: Vec<Box<dyn SystemCheck>>,
}

impl HealthCheckRunner {
    /// Creates a new runner with no checks
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Adds a check to the runner
    pub fn add_check<C: SystemCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Runs all registered checks in order and returns a report
    pub fn run(self) -> HealthCheckReport {
        let mut report = HealthCheckReport {
            results: Vec::with_capacity(self.checks.len()),
            total: 0,
            passed: 0,
            warned: 0,
            failed: 0,
        };

        for check in self.checks {
            let start = Instant::now();
            let result = check.check().with_duration(start.elapsed());

            match result.status {
                CheckStatus::Pass => {
                    report.passed += 1;
                    debug!(check = check.name(), message = %result.message, "Health check passed");
                }
                CheckStatus::Warn => {
                    report.warned += 1;
                    warn!(check = check.name(), message = %result.message, "Health check warned");
                }
                CheckStatus::Fail => {
                    report.failed += 1;
                    warn!(check = check.name(), message = %result.message, "Health check failed");
                }
            }

            report.results.push((check.name().to_string(), result));
        }

        report.total = report.results.len();
        report
    }
}

impl Default for HealthCheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(CheckStatus);

    impl SystemCheck for Fixed {
        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn check(&self) -> CheckResult {
            match self.0 {
                CheckStatus::Pass => CheckResult::pass("ok"),
                CheckStatus::Warn => CheckResult::warn("meh"),
                CheckStatus::Fail => CheckResult::fail("broken"),
            }
        }
    }

    #[test]
    fn test_counts_and_exit_codes() {
        let report = HealthCheckRunner::new()
            .add_check(Fixed(CheckStatus::Pass))
            .add_check(Fixed(CheckStatus::Warn))
            .run();
        assert_eq!((report.total, report.passed, report.warned), (2, 1, 1));
        assert!(report.is_healthy());
        assert_eq!(report.exit_code(), 2);
        assert_eq!(report.findings().count(), 1);

        let report = HealthCheckRunner::new()
            .add_check(Fixed(CheckStatus::Warn))
            .add_check(Fixed(CheckStatus::Fail))
            .run();
        assert!(!report.is_healthy());
        assert_eq!(report.exit_code(), 1);

        assert_eq!(HealthCheckRunner::new().run().exit_code(), 0);
    }
}
