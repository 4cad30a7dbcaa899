use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::application::container::Container;
use crate::application::errors::CommandError;

/// A raw platform event as delivered to subscribers
#[derive(Debug, Clone)]
pub struct EventPayload {
    pub name: String,
    pub guild_id: Option<String>,
    pub data: serde_json::Value,
}

impl EventPayload {
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            guild_id: None,
            data,
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

pub struct EventInvocation<'a> {
    pub container: &'a Arc<Container>,
    pub extension: &'a str,
    pub payload: &'a EventPayload,
}

/// Subscriber callback
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn run(&self, invocation: EventInvocation<'_>) -> Result<(), CommandError>;
}

/// Event subscription declared by an extension
pub struct Event {
    pub name: String,
    pub once: bool,
    handler: Arc<dyn EventHandler>,
}

impl Event {
    pub fn new(name: impl Into<String>, handler: impl EventHandler + 'static) -> Self {
        Self {
            name: name.into(),
            once: false,
            handler: Arc::new(handler),
        }
    }

    /// Unsubscribe automatically after the first delivery
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn handler(&self) -> &Arc<dyn EventHandler> {
        &self.handler
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("once", &self.once)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId {
    pub extension: String,
    pub name: String,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.extension, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredEvent {
    pub extension: String,
    pub event: Arc<Event>,
}

impl RegisteredEvent {
    pub fn new(extension: impl Into<String>, event: Event) -> Self {
        Self {
            extension: extension.into(),
            event: Arc::new(event),
        }
    }

    pub fn id(&self) -> EventId {
        EventId {
            extension: self.extension.clone(),
            name: self.event.name.clone(),
        }
    }
}
