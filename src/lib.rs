//! Extension runtime for chat bots
//!
//! Extensions declare commands, event subscriptions and scheduled tasks; the
//! runtime registers them, activates them per scope (globally or per guild),
//! routes text messages and interactions to their handlers and keeps the
//! platform's application commands in sync.

pub mod application;
pub mod domain;
pub mod extensions;
pub mod infrastructure;

pub use application::errors::RuntimeError;
pub use application::{Container, Runtime};
pub use infrastructure::config::Config;
