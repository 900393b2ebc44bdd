//! Health check system for validating configuration and engine state
//!
//! This module provides a framework for diagnosing the input engine, useful for:
//! - Validating configuration profiles before shipping them
//! - Surfacing conflicting bindings to the user
//! - CI/CD health checks
//!
//! # Example
//!
//! ```no_run
//! use layered_input::health::{HealthCheckRunner, checks::*};
//!
//! let report = HealthCheckRunner::new()
//!     .add_check(ConfigCheck::new())
//!     .add_check(BindingConflictCheck::new())
//!     .add_check(StackCheck::new())
//!     .run();
//!
//! if report.is_healthy() {
//!     println!("All systems operational!");
//! }
//! ```

pub mod check;
pub mod checks;
pub mod reporter;
pub mod runner;

pub use check::{CheckResult, CheckStatus, SystemCheck};
pub use reporter::{format_report, print_report};
pub use runner::{HealthCheckReport, HealthCheckRunner};

use crate::input::InputContext;

/// Runs all default health checks and returns a report
pub fn run_all_checks() -> HealthCheckReport {
    HealthCheckRunner::new()
        .add_check(checks::ConfigCheck::new())
        .add_check(checks::BindingConflictCheck::new())
        .add_check(checks::ActionConflictCheck::new())
        .add_check(checks::StackCheck::new())
        .run()
}

/// Diagnoses a live engine: its bindings, actions and scope stack
pub fn check_context(context: &InputContext) -> HealthCheckReport {
    HealthCheckRunner::new()
        .add_check(checks::BindingConflictCheck::from_map(context.button_map().clone()))
        .add_check(checks::ActionConflictCheck::from_registry(context.actions().clone()))
        .add_check(checks::StackCheck::from_stack(context.stack()))
        .run()
}
