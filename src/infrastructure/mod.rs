//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Cache: Cached-then-fetch entity lookup
//! - Adapters: Platform integrations (console)

pub mod adapters;
pub mod cache;
pub mod config;
