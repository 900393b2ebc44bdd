//! Binding conflict checks
//!
//! Conflicts are reported as warnings and never resolved automatically.

use crate::config::InputConfig;
use crate::health::check::{CheckResult, CheckStatus, SystemCheck};
use crate::input::{ActionRegistry, ButtonMap};

/// Checks for buttons assigned to more than one role or move direction
pub struct BindingConflictCheck {
    map: ButtonMap,
}

impl BindingConflictCheck {
    /// Checks the bindings of the environment's configuration profile
    pub fn new() -> Self {
        let config = InputConfig::load_from_env().unwrap_or_default();
        Self::from_map(ButtonMap::from_bindings(&config.bindings))
    }

    pub fn from_map(map: ButtonMap) -> Self {
        Self { map }
    }
}

impl Default for BindingConflictCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for BindingConflictCheck {
    fn name(&self) -> &'static str {
        "Button Bindings"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Reports buttons shared between roles and move directions")
    }

    fn check(&self) -> CheckResult {
        let conflicts = self.map.conflicts();
        if conflicts.is_empty() {
            return CheckResult::pass("No shared buttons");
        }

        conflicts.iter().fold(
            CheckResult::warn(format!("{} buttons have more than one use", conflicts.len())),
            |result, (button, uses)| {
                result.with_finding(CheckStatus::Warn, format!("{}: {}", button, uses.join(", ")))
            },
        )
    }
}

/// Checks for triggers bound to more than one action
pub struct ActionConflictCheck {
    registry: ActionRegistry,
}

impl ActionConflictCheck {
    /// Checks the actions of the environment's configuration profile
    pub fn new() -> Self {
        let config = InputConfig::load_from_env().unwrap_or_default();
        let mut registry = ActionRegistry::new();
        let mut invalid = 0;
        for (action, triggers) in &config.actions {
            if registry.register(action.as_str(), triggers.iter().copied()).is_err() {
                invalid += 1;
            }
        }
        if invalid > 0 {
            tracing::warn!(invalid, "Skipped invalid actions while checking conflicts");
        }
        Self::from_registry(registry)
    }

    pub fn from_registry(registry: ActionRegistry) -> Self {
        Self { registry }
    }
}

impl Default for ActionConflictCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for ActionConflictCheck {
    fn name(&self) -> &'static str {
        "Action Triggers"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Reports triggers that fire more than one action")
    }

    fn check(&self) -> CheckResult {
        let conflicts = self.registry.conflicts();
        if conflicts.is_empty() {
            return CheckResult::pass(format!("{} actions, no shared triggers", self.registry.len()));
        }

        conflicts.iter().fold(
            CheckResult::warn(format!("{} triggers fire more than one action", conflicts.len())),
            |result, (trigger, actions)| {
                let names: Vec<&str> = actions.iter().map(|action| action.as_str()).collect();
                result.with_finding(CheckStatus::Warn, format!("{}: {}", trigger, names.join(", ")))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;

    #[test]
    fn test_default_bindings_share_escape() {
        let result = BindingConflictCheck::from_map(ButtonMap::default()).check();
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.details.iter().any(|d| d.contains("Escape")));
    }

    #[test]
    fn test_action_conflicts_warn() {
        let mut registry = ActionRegistry::new();
        registry.register("jump", [Button::Space]).expect("register");
        assert_eq!(
            ActionConflictCheck::from_registry(registry.clone()).check().status,
            CheckStatus::Pass
        );

        registry.register("confirm", [Button::Space]).expect("register");
        let result = ActionConflictCheck::from_registry(registry).check();
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.details.iter().any(|d| d.contains("jump, confirm")));
    }
}
