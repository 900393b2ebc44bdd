//! Per-tick event synthesis and scoped dispatch

use indexmap::IndexSet;
use tracing::{debug, info, trace, warn};

use super::actions::ActionRegistry;
use super::capture::{CaptureSession, Keybinding, KeybindingCallback, KeybindingCapture};
use super::chord::ChordTracker;
use super::device::{ButtonMap, DeviceArbiter};
use super::events::{ActionId, Button, Chord, Device, InputEvent, Phase, Role, Trigger};
use super::handler::HandlerContext;
use super::movement::{MoveSources, MoveTracker};
use super::scope::{BlockBehavior, InputSnapshot, Scope, ScopeId, ScopeKey, ScopeView};
use super::stack::ScopeStack;
use super::state::{FrameState, RawSample, Transitions};
use crate::config::{BindingConfig, InputConfig};
use crate::error::Result;

/// Central input engine: owns the scope stack and synthesizes events each tick
pub struct InputContext {
    /// Button states of the current tick
    frame: FrameState,
    arbiter: DeviceArbiter,
    chords: ChordTracker,
    actions: ActionRegistry,
    buttons: ButtonMap,
    moves: MoveTracker,
    /// Sources feeding move and axis events
    move_sources: MoveSources,
    stack: ScopeStack,
    /// Capture requested this tick, armed at the start of the next
    capture_request: Option<KeybindingCallback>,
    capture: Option<CaptureSession>,
    /// Events synthesized last tick
    last_events: Vec<InputEvent>,
}

impl InputContext {
    /// Creates an engine with the default bindings and no actions
    pub fn new() -> Self {
        Self {
            frame: FrameState::new(),
            arbiter: DeviceArbiter::new(),
            chords: ChordTracker::new(),
            actions: ActionRegistry::new(),
            buttons: ButtonMap::default(),
            moves: MoveTracker::new(),
            move_sources: MoveSources::all(),
            stack: ScopeStack::new(),
            capture_request: None,
            capture: None,
            last_events: Vec::new(),
        }
    }

    /// Creates an engine from a loaded configuration, registering its actions
    pub fn from_config(config: &InputConfig) -> Result<Self> {
        let mut context = Self::new();
        context.apply_bindings(&config.bindings);
        context.move_sources = config.move_sources.flags();
        for (action, triggers) in &config.actions {
            context.register_action(action.as_str(), triggers.iter().copied())?;
        }
        info!(
            profile = %config.profile,
            actions = context.actions.len(),
            "Input context configured"
        );
        Ok(context)
    }

    /// Process one raw sample and dispatch the resulting events
    ///
    /// Call this exactly once per frame from the host loop.
    pub fn tick(&mut self, sample: RawSample) {
        self.arm_capture();

        let transitions = self.frame.begin_tick(sample);
        let events = self.generate_events(transitions);

        for event in &events {
            trace!(?event, "Dispatching");
            self.cascade(event);
        }

        self.finish_capture();
        self.last_events = events;
    }

    /// Generate semantic events from this tick's transitions
    fn generate_events(&mut self, transitions: Transitions) -> Vec<InputEvent> {
        let tick = self.frame.tick();
        let mut events = Vec::new();

        if let Some(device) = self.arbiter.update(self.frame.sample()) {
            events.push(InputEvent::DeviceChanged { device });
        }
        if let Some(device) = self.arbiter.cursor_motion_device(self.frame.sample()) {
            events.push(InputEvent::CursorMoved { device });
        }
        if self.arbiter.wheel_moved() {
            events.push(InputEvent::WheelMoved {
                delta: self.arbiter.wheel_delta(),
            });
        }

        for button in transitions.released {
            let chords = self.chords.release(button, tick);
            self.push_transition(&mut events, Phase::Released, &chords, &[button]);
        }

        for button in transitions.pressed {
            // Chords complete before the button that completed them is reported
            let chords = self.chords.press(button, tick);
            self.push_transition(&mut events, Phase::Pressed, &chords, &[button]);
        }

        let held_chords: Vec<Chord> = self.chords.held_chords(tick).collect();
        let held_buttons: Vec<Button> = self.frame.held_buttons().collect();
        self.push_transition(&mut events, Phase::Held, &held_chords, &held_buttons);

        events.extend(self.moves.update(&self.buttons, &self.frame, self.move_sources));
        events.push(InputEvent::Ticked { tick });
        events
    }

    /// Chord, button, action and role events for inputs sharing one phase
    fn push_transition(
        &self,
        events: &mut Vec<InputEvent>,
        phase: Phase,
        chords: &[Chord],
        buttons: &[Button],
    ) {
        events.extend(chords.iter().map(|&chord| InputEvent::Chord { phase, chord }));
        events.extend(buttons.iter().map(|&button| InputEvent::Button { phase, button }));

        let fired: Vec<Trigger> = chords
            .iter()
            .copied()
            .map(Trigger::Chord)
            .chain(buttons.iter().copied().map(Trigger::Button))
            .collect();
        self.push_actions(events, phase, &fired);

        for &button in buttons {
            for role in self.buttons.roles_for(button) {
                events.push(InputEvent::Role {
                    phase,
                    role,
                    button,
                    device: self.buttons.classify_role(role, button),
                });
            }
        }
    }

    /// Action events for `fired`, each action listing its triggers in
    /// registration order
    fn push_actions(&self, events: &mut Vec<InputEvent>, phase: Phase, fired: &[Trigger]) {
        let mut candidates: IndexSet<&ActionId> = IndexSet::new();
        for trigger in fired {
            candidates.extend(self.actions.actions_for_trigger(*trigger));
        }
        for action in candidates {
            for trigger in self
                .actions
                .triggers_for_action(action)
                .filter(|trigger| fired.contains(trigger))
            {
                events.push(InputEvent::Action {
                    phase,
                    action: action.clone(),
                    trigger,
                });
            }
        }
    }

    /// Walk the stack top-down, delivering `event` to reachable scopes
    ///
    /// The walk order is snapshotted up front; scopes removed by a handler
    /// are skipped and an active `Block` scope ends the walk.
    fn cascade(&mut self, event: &InputEvent) {
        for id in self.stack.walk_order() {
            let Some(scope) = self.stack.get(&id) else {
                continue;
            };
            let handlers = scope.matching(event);

            if self.stack.is_reachable(&id) {
                if id == ScopeId::Capture {
                    if let Some(session) = self.capture.as_mut() {
                        session
                            .capture
                            .feed(event, self.buttons.role_buttons(Role::Cancel));
                    }
                } else {
                    for (subscription, handler) in handlers {
                        let still_subscribed = self
                            .stack
                            .get(&id)
                            .is_some_and(|scope| scope.has_subscription(subscription));
                        if !still_subscribed || !self.stack.is_reachable(&id) {
                            continue;
                        }
                        let Ok(mut handler) = handler.try_borrow_mut() else {
                            warn!(scope = %id, "Handler is already running, skipping re-entrant delivery");
                            continue;
                        };

                        let input = InputSnapshot {
                            frame: &self.frame,
                            chords: &self.chords,
                            actions: &self.actions,
                            buttons: &self.buttons,
                            device: &self.arbiter,
                        };
                        let mut cx =
                            HandlerContext::new(&id, &mut self.stack, input, &mut self.capture_request);
                        handler.handle_event(&mut cx, event);
                    }
                }
            }

            if self.stack.get(&id).is_some_and(Scope::blocks_below) {
                break;
            }
        }
    }

    fn arm_capture(&mut self) {
        let Some(callback) = self.capture_request.take() else {
            return;
        };
        if self.end_capture().is_some() {
            debug!("Replacing active keybinding capture");
        }

        let global = self.stack.global_mut();
        let saved_global = (global.is_active(), global.block_behavior());
        global.force_state(false, BlockBehavior::PassBelow);
        self.stack
            .insert(ScopeId::Capture, true, BlockBehavior::Block);

        self.capture = Some(CaptureSession {
            capture: KeybindingCapture::new(),
            callback,
            saved_global,
        });
        debug!(tick = self.frame.tick() + 1, "Listening for keybinding");
    }

    /// Tear down the running capture, restoring the global scope
    fn end_capture(&mut self) -> Option<CaptureSession> {
        let session = self.capture.take()?;
        let (active, block) = session.saved_global;
        self.stack.global_mut().force_state(active, block);
        if self.stack.detach(&ScopeId::Capture).is_none() {
            warn!("Keybinding capture scope was already detached");
        }
        Some(session)
    }

    /// Invoke the callback of a capture that resolved this tick
    fn finish_capture(&mut self) {
        if !self
            .capture
            .as_ref()
            .is_some_and(|session| session.capture.is_resolved())
        {
            return;
        }
        if let Some(session) = self.end_capture() {
            let binding = session.capture.outcome().flatten();
            debug!(binding = ?binding, "Keybinding capture finished");
            (session.callback)(binding);
        }
    }

    /// Listen for one keybinding, starting next tick
    ///
    /// A new request replaces any pending or running capture; the replaced
    /// callback is dropped without being called.
    pub fn listen_for_keybinding(&mut self, callback: impl FnOnce(Option<Keybinding>) + 'static) {
        self.capture_request = Some(Box::new(callback));
    }

    /// Abandon any pending or running capture without calling its callback
    pub fn stop_listening_for_keybinding(&mut self) {
        self.capture_request = None;
        if self.end_capture().is_some() {
            debug!("Stopped listening for keybinding");
        }
    }

    /// A capture is pending or running
    pub fn is_capturing(&self) -> bool {
        self.capture_request.is_some() || self.capture.is_some()
    }

    /// Create a scope on top of the stack
    pub fn create_scope(
        &mut self,
        key: impl Into<ScopeKey>,
        active: bool,
        block: BlockBehavior,
    ) -> Result<&mut Scope> {
        self.stack.create(key, active, block)
    }

    /// Remove a scope, detaching all of its subscriptions
    pub fn remove_scope(&mut self, id: impl Into<ScopeId>) -> Result<Scope> {
        self.stack.remove(&id.into())
    }

    pub fn get_scope(&self, id: impl Into<ScopeId>) -> Option<&Scope> {
        self.stack.get(&id.into())
    }

    pub fn get_scope_mut(&mut self, id: impl Into<ScopeId>) -> Option<&mut Scope> {
        self.stack.get_mut(&id.into())
    }

    pub fn move_to_top(&mut self, id: impl Into<ScopeId>) -> Result<()> {
        self.stack.move_to_top(&id.into())
    }

    /// The fixed topmost scope, for subscriptions
    pub fn global(&self) -> &Scope {
        self.stack.global()
    }

    /// Activity and block behaviour of the global scope stay pinned
    pub fn global_mut(&mut self) -> &mut Scope {
        self.stack.global_mut()
    }

    pub fn stack(&self) -> &ScopeStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ScopeStack {
        &mut self.stack
    }

    /// Pull queries for a scope, `None` for unknown scopes
    pub fn scope(&self, id: impl Into<ScopeId>) -> Option<ScopeView<'_>> {
        let id = id.into();
        let Some(scope) = self.stack.get(&id) else {
            warn!(scope = %id, "Query on unknown scope");
            return None;
        };
        Some(ScopeView::new(scope.id(), &self.stack, self.snapshot()))
    }

    pub fn is_reachable(&self, id: impl Into<ScopeId>) -> bool {
        self.scope(id).is_some_and(|view| view.is_reachable())
    }

    fn snapshot(&self) -> InputSnapshot<'_> {
        InputSnapshot {
            frame: &self.frame,
            chords: &self.chords,
            actions: &self.actions,
            buttons: &self.buttons,
            device: &self.arbiter,
        }
    }

    /// Register `action`, appending to its existing triggers
    pub fn register_action<T>(
        &mut self,
        action: impl Into<ActionId>,
        triggers: impl IntoIterator<Item = T>,
    ) -> Result<()>
    where
        T: Into<Trigger>,
    {
        self.actions.register(action, triggers)
    }

    pub fn unregister_action(&mut self, action: impl Into<ActionId>) -> bool {
        self.actions.unregister(&action.into())
    }

    pub fn actions_for_button(&self, button: Button) -> impl Iterator<Item = &ActionId> {
        self.actions.actions_for_button(button)
    }

    pub fn actions_for_chord(&self, chord: Chord) -> impl Iterator<Item = &ActionId> {
        self.actions.actions_for_chord(chord)
    }

    pub fn chords_for_action(&self, action: impl Into<ActionId>) -> Vec<Chord> {
        self.actions.chords_for_action(&action.into()).collect()
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Rebuild the button role and move maps after a settings change
    pub fn apply_bindings(&mut self, bindings: &BindingConfig) {
        self.buttons = ButtonMap::from_bindings(bindings);
        debug!("Applied button bindings");
    }

    pub fn button_map(&self) -> &ButtonMap {
        &self.buttons
    }

    pub fn set_move_sources(&mut self, sources: MoveSources) {
        self.move_sources = sources;
    }

    pub fn move_sources(&self) -> MoveSources {
        self.move_sources
    }

    pub fn current_device(&self) -> Device {
        self.arbiter.current()
    }

    /// Ticks processed so far
    pub fn tick_count(&self) -> u64 {
        self.frame.tick()
    }

    /// Events synthesized during the last tick, in dispatch order
    pub fn last_events(&self) -> &[InputEvent] {
        &self.last_events
    }
}

impl Default for InputContext {
    fn default() -> Self {
        Self::new()
    }
}
