//! Domain layer - Core types of the extension runtime
//!
//! This layer contains:
//! - Entities: users, messages, interactions, commands, events, extensions, scopes
//! - Registry: the uniqueness-checked store every lifecycle operation writes to
//! - Traits: Abstractions for the platform (Bot, EntityLookup, ApplicationCommandClient)

pub mod entities;
pub mod registry;
pub mod traits;
