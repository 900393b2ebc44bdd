//! Scopes: independently activatable nodes of the input stack
//!
//! A [`Scope`] owns push subscriptions. A [`ScopeView`] answers pull queries
//! for one scope, every answer gated by that scope's reachability.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::warn;

use super::actions::ActionRegistry;
use super::chord::ChordTracker;
use super::device::{ButtonMap, DeviceArbiter};
use super::events::{ActionId, Button, Chord, Device, Direction, InputEvent, MoveAxis, MoveSource, Role, Trigger};
use super::handler::{EventFilter, HandlerContext, InputHandler};
use super::movement::{self, MoveSources};
use super::stack::ScopeStack;
use super::state::{ButtonState, FrameState};

/// Caller-supplied scope identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey(Arc<str>);

impl ScopeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank keys cannot name a scope
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl From<&str> for ScopeKey {
    fn from(key: &str) -> Self {
        Self(Arc::from(key))
    }
}

impl From<String> for ScopeKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position-independent identity of a scope in the stack
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeId {
    /// The fixed topmost scope
    Global,
    /// Transient scope owned by an interactive keybinding capture
    Capture,
    /// A caller-created scope
    Key(ScopeKey),
}

impl From<ScopeKey> for ScopeId {
    fn from(key: ScopeKey) -> Self {
        Self::Key(key)
    }
}

impl From<&str> for ScopeId {
    fn from(key: &str) -> Self {
        Self::Key(key.into())
    }
}

impl From<String> for ScopeId {
    fn from(key: String) -> Self {
        Self::Key(key.into())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("<global>"),
            Self::Capture => f.write_str("<keybinding-capture>"),
            Self::Key(key) => key.fmt(f),
        }
    }
}

/// Whether scopes below may become reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockBehavior {
    /// Same as `PassBelow` for reachability
    None,
    /// An active scope with this setting hides every scope below it
    #[default]
    Block,
    /// Never stops propagation
    PassBelow,
}

/// Handle returned by [`Scope::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared, mutably borrowed handler
pub type SharedHandler = Rc<RefCell<dyn InputHandler>>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: SharedHandler,
}

/// A named node of the input stack
pub struct Scope {
    id: ScopeId,
    active: bool,
    block: BlockBehavior,
    /// Activity and block behaviour can only change from inside the crate
    pinned: bool,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
}

impl Scope {
    /// Engine-owned scopes (global and capture) come out pinned
    pub(crate) fn new(id: ScopeId, active: bool, block: BlockBehavior) -> Self {
        Self {
            pinned: !matches!(id, ScopeId::Key(_)),
            id,
            active,
            block,
            subscriptions: Vec::new(),
            next_subscription: 0,
        }
    }

    pub(crate) fn global() -> Self {
        Self::new(ScopeId::Global, true, BlockBehavior::PassBelow)
    }

    pub fn id(&self) -> &ScopeId {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn block_behavior(&self) -> BlockBehavior {
        self.block
    }

    /// Suspend or resume this scope
    pub fn set_active(&mut self, active: bool) {
        if self.pinned {
            warn!(scope = %self.id, "Activity of an engine-owned scope cannot be changed");
            return;
        }
        self.active = active;
    }

    pub fn set_block_behavior(&mut self, block: BlockBehavior) {
        if self.pinned {
            warn!(scope = %self.id, "Block behaviour of an engine-owned scope cannot be changed");
            return;
        }
        self.block = block;
    }

    /// Override activity and block behaviour, ignoring the pin
    pub(crate) fn force_state(&mut self, active: bool, block: BlockBehavior) {
        self.active = active;
        self.block = block;
    }

    /// Active and set to `Block`
    pub fn blocks_below(&self) -> bool {
        self.active && self.block == BlockBehavior::Block
    }

    /// Subscribe a closure to events matching `filter`
    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut HandlerContext<'_>, &InputEvent) + 'static,
    {
        self.subscribe_shared(filter, Rc::new(RefCell::new(handler)))
    }

    /// Subscribe a handler object to events matching `filter`
    pub fn add_handler(
        &mut self,
        filter: EventFilter,
        handler: impl InputHandler + 'static,
    ) -> SubscriptionId {
        self.subscribe_shared(filter, Rc::new(RefCell::new(handler)))
    }

    /// Subscribe a handler the caller keeps a reference to
    pub fn subscribe_shared(&mut self, filter: EventFilter, handler: SharedHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.push(Subscription {
            id,
            filter,
            handler,
        });
        id
    }

    /// Remove a subscription, returning whether it existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    pub fn has_subscription(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|subscription| subscription.id == id)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Subscriptions interested in `event`, in subscription order
    pub(crate) fn matching(&self, event: &InputEvent) -> Vec<(SubscriptionId, SharedHandler)> {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.filter.matches(event))
            .map(|subscription| (subscription.id, Rc::clone(&subscription.handler)))
            .collect()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("block", &self.block)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// Read-only engine state shared by every query in a tick
#[derive(Clone, Copy)]
pub struct InputSnapshot<'a> {
    pub(crate) frame: &'a FrameState,
    pub(crate) chords: &'a ChordTracker,
    pub(crate) actions: &'a ActionRegistry,
    pub(crate) buttons: &'a ButtonMap,
    pub(crate) device: &'a DeviceArbiter,
}

/// Pull queries answered from one scope's point of view
///
/// Every query answers false / `None` while the scope is unreachable.
#[derive(Clone, Copy)]
pub struct ScopeView<'a> {
    id: &'a ScopeId,
    stack: &'a ScopeStack,
    input: InputSnapshot<'a>,
}

impl<'a> ScopeView<'a> {
    pub(crate) fn new(id: &'a ScopeId, stack: &'a ScopeStack, input: InputSnapshot<'a>) -> Self {
        Self { id, stack, input }
    }

    pub fn id(&self) -> &ScopeId {
        self.id
    }

    pub fn is_reachable(&self) -> bool {
        self.stack.is_reachable(self.id)
    }

    fn button_state(&self, button: Button) -> Option<ButtonState> {
        self.is_reachable().then(|| self.input.frame.state(button))
    }

    pub fn is_button_pressed(&self, button: Button) -> bool {
        self.button_state(button).is_some_and(ButtonState::is_just_pressed)
    }

    /// Button is down, including the tick it went down
    pub fn is_button_held(&self, button: Button) -> bool {
        self.button_state(button).is_some_and(ButtonState::is_down)
    }

    pub fn is_button_released(&self, button: Button) -> bool {
        self.button_state(button).is_some_and(ButtonState::is_just_released)
    }

    pub fn is_pair_pressed(&self, chord: Chord) -> bool {
        self.is_reachable() && self.input.chords.is_pair_pressed(chord, self.input.frame)
    }

    pub fn is_pair_held(&self, chord: Chord) -> bool {
        self.is_reachable() && self.input.chords.is_pair_held(chord, self.input.frame)
    }

    pub fn is_pair_released(&self, chord: Chord) -> bool {
        self.is_reachable() && self.input.chords.is_pair_released(chord, self.input.frame)
    }

    /// First trigger of `action`, in registration order, satisfying the tests
    fn match_action(
        &self,
        action: &ActionId,
        button_test: impl Fn(ButtonState) -> bool,
        chord_test: impl Fn(&ChordTracker, Chord, &FrameState) -> bool,
    ) -> Option<Trigger> {
        if !self.is_reachable() {
            return None;
        }
        let frame = self.input.frame;
        self.input
            .actions
            .triggers_for_action(action)
            .find(|trigger| match *trigger {
                Trigger::Button(button) => button_test(frame.state(button)),
                Trigger::Chord(chord) => chord_test(self.input.chords, chord, frame),
            })
    }

    /// Trigger that pressed `action` this tick
    pub fn is_action_pressed(&self, action: impl Into<ActionId>) -> Option<Trigger> {
        self.match_action(
            &action.into(),
            ButtonState::is_just_pressed,
            ChordTracker::is_pair_pressed,
        )
    }

    /// Trigger currently holding `action` down
    pub fn is_action_held(&self, action: impl Into<ActionId>) -> Option<Trigger> {
        self.match_action(&action.into(), ButtonState::is_down, ChordTracker::is_pair_held)
    }

    /// Trigger that released `action` this tick
    pub fn is_action_released(&self, action: impl Into<ActionId>) -> Option<Trigger> {
        self.match_action(
            &action.into(),
            ButtonState::is_just_released,
            ChordTracker::is_pair_released,
        )
    }

    fn match_role(&self, role: Role, test: impl Fn(ButtonState) -> bool) -> Option<Button> {
        if !self.is_reachable() {
            return None;
        }
        self.input
            .buttons
            .role_buttons(role)
            .iter()
            .copied()
            .find(|button| test(self.input.frame.state(*button)))
    }

    /// Bound button that pressed `role` this tick
    pub fn role_pressed(&self, role: Role) -> Option<Button> {
        self.match_role(role, ButtonState::is_just_pressed)
    }

    pub fn role_held(&self, role: Role) -> Option<Button> {
        self.match_role(role, ButtonState::is_down)
    }

    pub fn role_released(&self, role: Role) -> Option<Button> {
        self.match_role(role, ButtonState::is_just_released)
    }

    fn match_move(
        &self,
        direction: Direction,
        sources: MoveSources,
        test: impl Fn(ButtonState) -> bool,
    ) -> Option<(MoveSource, Button)> {
        if !self.is_reachable() {
            return None;
        }
        movement::resolve(self.input.buttons, self.input.frame, direction, sources, test)
    }

    /// Winning source that pressed `direction` this tick
    pub fn is_move_pressed(&self, direction: Direction, sources: MoveSources) -> Option<MoveSource> {
        self.match_move(direction, sources, ButtonState::is_just_pressed)
            .map(|(source, _)| source)
    }

    pub fn is_move_held(&self, direction: Direction, sources: MoveSources) -> Option<MoveSource> {
        self.match_move(direction, sources, ButtonState::is_down)
            .map(|(source, _)| source)
    }

    pub fn is_move_released(&self, direction: Direction, sources: MoveSources) -> Option<MoveSource> {
        self.match_move(direction, sources, ButtonState::is_just_released)
            .map(|(source, _)| source)
    }

    /// Button currently driving `direction`
    pub fn move_button_held(&self, direction: Direction, sources: MoveSources) -> Option<Button> {
        self.match_move(direction, sources, ButtonState::is_down)
            .map(|(_, button)| button)
    }

    /// Combined axis of the enabled sources, zero while unreachable
    pub fn get_move_axis(&self, sources: MoveSources) -> MoveAxis {
        if !self.is_reachable() {
            return MoveAxis::ZERO;
        }
        movement::combine(|direction| {
            movement::resolve(
                self.input.buttons,
                self.input.frame,
                direction,
                sources,
                ButtonState::is_down,
            )
            .is_some()
        })
    }

    /// Device the cursor moved with this tick, limited to the enabled devices
    pub fn is_cursor_moved(&self, mouse: bool, controller: bool) -> Device {
        if !self.is_reachable() {
            return Device::None;
        }
        match self.input.device.cursor_motion_device(self.input.frame.sample()) {
            Some(Device::Mouse) if mouse => Device::Mouse,
            Some(Device::Controller) if controller => Device::Controller,
            _ => Device::None,
        }
    }

    pub fn is_wheel_moved(&self) -> bool {
        self.is_reachable() && self.input.device.wheel_moved()
    }

    pub fn cursor_screen_pos(&self) -> Option<[f32; 2]> {
        self.input.frame.sample().cursor_screen_pos
    }

    pub fn cursor_tile(&self) -> Option<[i32; 2]> {
        self.input.frame.sample().cursor_tile
    }

    /// Cumulative scroll position (horizontal, vertical)
    pub fn wheel_pos(&self) -> [f32; 2] {
        self.input.frame.sample().scroll
    }

    pub fn current_device(&self) -> Device {
        self.input.device.current()
    }
}
