//! Layered Input
//!
//! Scope-based input routing for games and tools built on winit.

/// Layered configuration: bindings, move sources, actions and logging
pub mod config;

/// Error types shared by the engine and configuration
pub mod error;

/// Diagnostics for configuration, bindings and the scope stack
pub mod health;

/// Input engine - sampling, event synthesis and scoped dispatch
pub mod input;

pub use config::InputConfig;
pub use error::{InputError, Result};
pub use input::InputContext;
