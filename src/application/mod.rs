//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Container: the composition root holding registries and collaborators
//! - Runtime: one independent runtime instance
//! - Messaging: prefix parsing, argument resolution, dispatch, hooks, events
//! - Services: application command reconciliation
//! - Errors: Domain-specific errors

pub mod container;
pub mod errors;
pub mod messaging;
pub mod runtime;
pub mod services;

pub use container::{ComponentListener, Container, ContainerBuilder, PluginFilter};
pub use runtime::{Runtime, StartReport};
