//! Layered input routing
//!
//! Provides a scope-based input routing system that:
//! - Collects raw input from winit events (or any host sampler)
//! - Synthesizes press/hold/release events for buttons, chords and actions
//! - Resolves menu roles and directional movement across devices
//! - Cascades events top-down through a stack of blockable scopes
//! - Captures new keybindings interactively
//!
//! # Architecture
//!
//! ```text
//! Raw Input (winit) → InputCollector → RawSample
//!                                          ↓
//!                                    InputContext
//!              (DeviceArbiter → ChordTracker → ActionRegistry → moves)
//!                                          ↓
//!                                     ScopeStack
//!                       Global → topmost scope → … → bottom scope
//!                       (stops after the first active Block scope)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut input = InputContext::from_config(&InputConfig::load_from_env()?)?;
//! input
//!     .create_scope("menu", true, BlockBehavior::Block)?
//!     .subscribe(EventFilter::kind(EventKind::Role(Role::Cancel)), |cx, _| {
//!         let id = cx.scope().clone();
//!         let _ = cx.stack_mut().remove(&id);
//!     });
//!
//! // In window_event()
//! collector.handle_window_event(&event);
//!
//! // Each frame
//! input.tick(collector.sample());
//! if input.scope("hud").is_some_and(|hud| hud.is_action_pressed("jump").is_some()) { … }
//! ```

mod actions;
mod capture;
mod chord;
mod collector;
mod context;
mod device;
mod events;
mod handler;
mod movement;
mod scope;
mod stack;
mod state;

// Re-export public API
pub use actions::ActionRegistry;
pub use capture::{Keybinding, KeybindingCallback, KeybindingCapture};
pub use chord::ChordTracker;
pub use collector::InputCollector;
pub use context::InputContext;
pub use device::{ButtonMap, DeviceArbiter};
pub use events::{
    ActionId, Button, Chord, Device, Direction, EventKind, InputEvent, MoveAxis, MoveSource, Phase,
    Role, Trigger,
};
pub use handler::{EventFilter, HandlerContext, InputHandler};
pub use movement::{MoveSources, MoveTracker};
pub use scope::{BlockBehavior, InputSnapshot, Scope, ScopeId, ScopeKey, ScopeView, SharedHandler, SubscriptionId};
pub use stack::ScopeStack;
pub use state::{ButtonState, FrameState, RawSample, Transitions};
