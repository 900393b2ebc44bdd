//! Core health check trait and types

use std::time::Duration;

/// Status of a system check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckStatus {
    /// Nothing to report
    Pass,
    /// Usable, but the user should look at the details (e.g. shared bindings)
    Warn,
    /// Unusable configuration or broken invariant
    Fail,
}

impl CheckStatus {
    /// Returns true if the check passed (Pass or Warn)
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Pass | CheckStatus::Warn)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }

    /// Marker used at the start of detail lines
    pub fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✓",
            CheckStatus::Warn => "⚠",
            CheckStatus::Fail => "✗",
        }
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => "PASS".green().to_string(),
            CheckStatus::Warn => "WARN".yellow().to_string(),
            CheckStatus::Fail => "FAIL".red().to_string(),
        }
    }
}

/// Result of a system check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub status: CheckStatus,
    /// One-line summary
    pub message: String,
    /// Detail lines, one finding each
    pub details: Vec<String>,
    /// How long the check took
    pub duration: Duration,
}

impl CheckResult {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Fail, message)
    }

    /// Adds a detail line prefixed with the marker of `status`
    pub fn with_finding(mut self, status: CheckStatus, finding: impl AsRef<str>) -> Self {
        self.details
            .push(format!("{} {}", status.symbol(), finding.as_ref()));
        self
    }

    /// Adds preformatted detail lines
    pub fn with_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.details.extend(details);
        self
    }

    /// Sets the duration for this check
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Trait for system health checks
pub trait SystemCheck {
    /// Name of the system being checked
    fn name(&self) -> &'static str;

    /// Perform the health check
    fn check(&self) -> CheckResult;

    /// Optional description of what this check validates
    fn description(&self) -> Option<&'static str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(CheckStatus::Pass < CheckStatus::Warn);
        assert!(CheckStatus::Warn < CheckStatus::Fail);
        assert_eq!(CheckStatus::Warn.max(CheckStatus::Pass), CheckStatus::Warn);
        assert!(CheckStatus::Warn.is_ok());
        assert!(CheckStatus::Fail.is_fail());
    }

    #[test]
    fn test_findings_are_marked() {
        let result = CheckResult::warn("shared buttons")
            .with_finding(CheckStatus::Warn, "Escape: cancel, menu")
            .with_finding(CheckStatus::Pass, "Enter: confirm");
        assert_eq!(
            result.details,
            vec!["⚠ Escape: cancel, menu".to_string(), "✓ Enter: confirm".to_string()]
        );
    }
}
