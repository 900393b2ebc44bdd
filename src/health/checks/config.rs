//! Configuration system health check

use crate::config::InputConfig;
use crate::health::check::{CheckResult, CheckStatus, SystemCheck};
use crate::input::InputContext;

/// Checks that configuration can be loaded and applied for all profiles
pub struct ConfigCheck {
    profiles: Vec<String>,
}

impl ConfigCheck {
    /// Creates a new config check for the default profile
    pub fn new() -> Self {
        Self {
            profiles: vec!["default".to_string()],
        }
    }

    /// Creates a config check with custom profiles
    pub fn with_profiles<S: Into<String>>(profiles: impl IntoIterator<Item = S>) -> Self {
        Self {
            profiles: profiles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ConfigCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an engine from a loaded configuration and summarize it
fn validate(config: crate::error::Result<InputConfig>) -> Result<String, String> {
    let config = config.map_err(|e| e.to_string())?;
    let context = InputContext::from_config(&config).map_err(|e| e.to_string())?;
    Ok(format!(
        "{} actions, {} move sources",
        context.actions().len(),
        context.move_sources().iter().count()
    ))
}

impl SystemCheck for ConfigCheck {
    fn name(&self) -> &'static str {
        "Configuration"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates configuration loading from files and environment")
    }

    fn check(&self) -> CheckResult {
        let mut findings = Vec::new();

        for profile in &self.profiles {
            match validate(InputConfig::load(profile)) {
                Ok(summary) => findings.push((
                    CheckStatus::Pass,
                    format!("Profile '{}': loaded ({})", profile, summary),
                )),
                Err(e) => findings.push((
                    CheckStatus::Fail,
                    format!("Profile '{}': failed to load - {}", profile, e),
                )),
            }
        }

        match validate(InputConfig::load_from_env()) {
            Ok(summary) => findings.push((
                CheckStatus::Pass,
                format!("Environment config: loaded ({})", summary),
            )),
            Err(e) => findings.push((CheckStatus::Warn, format!("Environment config: {}", e))),
        }

        let worst = findings
            .iter()
            .map(|(status, _)| *status)
            .max()
            .unwrap_or(CheckStatus::Pass);
        let result = match worst {
            CheckStatus::Fail => CheckResult::fail("Failed to load one or more config profiles"),
            CheckStatus::Warn => CheckResult::warn("Config loaded with warnings"),
            CheckStatus::Pass => {
                CheckResult::pass(format!("{} profiles validated", self.profiles.len()))
            }
        };
        findings
            .into_iter()
            .fold(result, |result, (status, finding)| result.with_finding(status, finding))
    }
}
