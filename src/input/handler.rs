//! Input handler trait for scope subscribers

use super::capture::KeybindingCallback;
use super::events::{EventKind, InputEvent, Phase};
use super::scope::{InputSnapshot, ScopeId, ScopeView};
use super::stack::ScopeStack;

/// Trait for subscribers attached to a scope
///
/// Handlers run synchronously inside the tick and may mutate the scope stack
/// through their context, including removing their own scope.
pub trait InputHandler {
    /// Name of this handler for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle an event that reached the subscribing scope
    fn handle_event(&mut self, cx: &mut HandlerContext<'_>, event: &InputEvent);
}

impl<F> InputHandler for F
where
    F: FnMut(&mut HandlerContext<'_>, &InputEvent),
{
    fn handle_event(&mut self, cx: &mut HandlerContext<'_>, event: &InputEvent) {
        self(cx, event)
    }
}

/// Which events a subscription receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    pub phase: Option<Phase>,
}

impl EventFilter {
    /// Every event
    pub fn all() -> Self {
        Self::default()
    }

    /// Every event of one kind, any phase
    pub fn kind(kind: EventKind) -> Self {
        Self {
            kind: Some(kind),
            phase: None,
        }
    }

    pub fn pressed() -> Self {
        Self::all().with_phase(Phase::Pressed)
    }

    pub fn held() -> Self {
        Self::all().with_phase(Phase::Held)
    }

    pub fn released() -> Self {
        Self::all().with_phase(Phase::Released)
    }

    /// Builder method to restrict the phase
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn matches(&self, event: &InputEvent) -> bool {
        self.kind.is_none_or(|kind| kind == event.kind())
            && self.phase.is_none_or(|phase| event.phase() == Some(phase))
    }
}

/// What a handler can see and change while an event is delivered
pub struct HandlerContext<'a> {
    scope: &'a ScopeId,
    stack: &'a mut ScopeStack,
    input: InputSnapshot<'a>,
    capture_request: &'a mut Option<KeybindingCallback>,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(
        scope: &'a ScopeId,
        stack: &'a mut ScopeStack,
        input: InputSnapshot<'a>,
        capture_request: &'a mut Option<KeybindingCallback>,
    ) -> Self {
        Self {
            scope,
            stack,
            input,
            capture_request,
        }
    }

    /// Scope the event is being delivered to
    pub fn scope(&self) -> &ScopeId {
        self.scope
    }

    /// Pull queries from the delivering scope's point of view
    pub fn view(&self) -> ScopeView<'_> {
        ScopeView::new(self.scope, self.stack, self.input)
    }

    /// Pull queries from another scope's point of view
    pub fn view_of<'b>(&'b self, id: &'b ScopeId) -> ScopeView<'b> {
        ScopeView::new(id, self.stack, self.input)
    }

    pub fn stack(&self) -> &ScopeStack {
        self.stack
    }

    /// The stack may be restructured mid-cascade
    pub fn stack_mut(&mut self) -> &mut ScopeStack {
        self.stack
    }

    /// Request a keybinding capture; it starts listening next tick
    pub fn listen_for_keybinding(&mut self, callback: KeybindingCallback) {
        *self.capture_request = Some(callback);
    }
}
