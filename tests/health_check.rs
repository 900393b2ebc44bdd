//! Integration tests for the health check system

use layered_input::health::{self, CheckStatus, HealthCheckRunner, SystemCheck, checks::*};
use layered_input::input::{BlockBehavior, Button, InputContext};

#[test]
fn test_all_health_checks() {
    let report = health::run_all_checks();

    if !report.is_healthy() {
        eprintln!("\n{}", health::format_report(&report, true));
    }

    assert!(
        report.is_healthy(),
        "Health checks failed: {} failures, {} warnings",
        report.failed,
        report.warned
    );
    assert_eq!(report.total, 4);
}

#[test]
fn test_config_check() {
    let result = ConfigCheck::new().check();
    assert!(
        result.status.is_ok(),
        "Config check failed: {}",
        result.message
    );
}

#[test]
fn test_missing_profile_falls_back_to_defaults() {
    // Profile files are optional; absent ones load the built-in defaults
    let result = ConfigCheck::with_profiles(["does-not-exist"]).check();
    assert!(result.status.is_ok(), "{:?}", result.details);
}

#[test]
fn test_stack_check() {
    let result = StackCheck::new().check();
    assert_eq!(result.status, CheckStatus::Pass, "{:?}", result.details);
}

#[test]
fn test_default_bindings_report_shared_escape() {
    let result = BindingConflictCheck::new().check();
    assert_eq!(result.status, CheckStatus::Warn);
    assert!(result.details.iter().any(|line| line.contains("Escape")));
}

#[test]
fn test_live_context_report() {
    let mut context = InputContext::new();
    context
        .register_action("confirm", [Button::Enter])
        .expect("register");
    context
        .register_action("submit", [Button::Enter])
        .expect("register");
    context
        .create_scope("menu", true, BlockBehavior::Block)
        .expect("create");

    let report = health::check_context(&context);
    assert!(report.is_healthy());
    assert_eq!(report.exit_code(), 2, "shared triggers are warnings");

    let findings: Vec<&str> = report.findings().map(|(name, _)| name).collect();
    assert!(findings.contains(&"Action Triggers"));
    assert!(findings.contains(&"Button Bindings"));
    assert!(!findings.contains(&"Scope Stack"));
}

#[test]
fn test_custom_health_check_runner() {
    let report = HealthCheckRunner::new()
        .add_check(ConfigCheck::new())
        .add_check(StackCheck::new())
        .run();

    assert_eq!(report.total, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.passed + report.warned, 2);
}
