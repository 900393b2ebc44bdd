//! Scope stack health check

use crate::health::check::{CheckResult, CheckStatus, SystemCheck};
use crate::input::{BlockBehavior, InputContext, RawSample, ScopeId, ScopeStack};

/// Checks scope stack invariants, either on a live stack or a scratch engine
pub struct StackCheck {
    /// Problems found in a live stack, `None` to exercise a scratch engine
    snapshot: Option<(usize, Vec<String>)>,
}

impl StackCheck {
    pub fn new() -> Self {
        Self { snapshot: None }
    }

    /// Check the invariants of an existing stack
    pub fn from_stack(stack: &ScopeStack) -> Self {
        Self {
            snapshot: Some((stack.len(), stack.check_invariants())),
        }
    }

    fn check_scratch(&self) -> CheckResult {
        let mut findings = Vec::new();
        let mut context = InputContext::new();
        let step = |label: &str, ok: bool, findings: &mut Vec<(CheckStatus, String)>| {
            let status = if ok { CheckStatus::Pass } else { CheckStatus::Fail };
            findings.push((status, label.to_string()));
            ok
        };

        let mut ok = true;
        for (key, block) in [("hud", BlockBehavior::PassBelow), ("menu", BlockBehavior::Block)] {
            ok &= step(
                &format!("create scope '{}'", key),
                context.create_scope(key, true, block).is_ok(),
                &mut findings,
            );
        }
        context.tick(RawSample::new());

        ok &= step(
            "active Block scope hides scopes below",
            context.is_reachable("menu") && !context.is_reachable("hud"),
            &mut findings,
        );
        ok &= step(
            "moving a scope to top restores its reachability",
            context.move_to_top("hud").is_ok() && context.is_reachable("hud"),
            &mut findings,
        );
        ok &= step(
            "removing a scope detaches it",
            context.remove_scope("menu").is_ok() && context.get_scope("menu").is_none(),
            &mut findings,
        );

        context.global_mut().set_active(false);
        ok &= step(
            "global scope stays pinned",
            context.global().is_active() && context.is_reachable(ScopeId::Global),
            &mut findings,
        );

        let problems = context.stack().check_invariants();
        ok &= step("order and registry in lock-step", problems.is_empty(), &mut findings);
        findings.extend(problems.into_iter().map(|problem| (CheckStatus::Fail, problem)));

        let result = if ok {
            CheckResult::pass("Scope stack operational")
        } else {
            CheckResult::fail("Scope stack misbehaved")
        };
        findings
            .into_iter()
            .fold(result, |result, (status, finding)| result.with_finding(status, finding))
    }
}

impl Default for StackCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for StackCheck {
    fn name(&self) -> &'static str {
        "Scope Stack"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates scope ordering, reachability and the pinned global scope")
    }

    fn check(&self) -> CheckResult {
        match &self.snapshot {
            None => self.check_scratch(),
            Some((scopes, problems)) if problems.is_empty() => {
                CheckResult::pass(format!("{} scopes, invariants hold", scopes))
            }
            Some((_, problems)) => problems.iter().fold(
                CheckResult::fail("Scope stack is inconsistent"),
                |result, problem| result.with_finding(CheckStatus::Fail, problem),
            ),
        }
    }
}
