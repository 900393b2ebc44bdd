//! Built-in health checks for the input engine

pub mod bindings;
pub mod config;
pub mod stack;

pub use bindings::{ActionConflictCheck, BindingConflictCheck};
pub use config::ConfigCheck;
pub use stack::StackCheck;
