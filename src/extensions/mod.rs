//! Extensions - lifecycle management, loading and the built-in extension

pub mod builtin;
pub mod loader;
pub mod manager;

pub use builtin::{core_extension, CORE_EXTENSION};
pub use loader::{Discovered, ExtensionLoader, StaticLoader};
pub use manager::{ExtensionManager, ExtensionOutcome, ExtensionStatus, UnloadReport};
