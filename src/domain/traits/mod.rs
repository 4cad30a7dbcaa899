//! Domain traits - Abstractions for the platform collaborators

pub mod bot;
pub mod commands;
pub mod lookup;

pub use bot::{Bot, BotInfo};
pub use commands::ApplicationCommandClient;
pub use lookup::EntityLookup;
