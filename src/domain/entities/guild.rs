use serde::{Deserialize, Serialize};
use std::fmt;

/// A guild (tenant) the bot is a member of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
}

impl Guild {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Kind of channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    Text,
    Voice,
    Thread,
    Direct,
}

/// A channel messages are posted into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: Option<String>,
    pub guild_id: Option<String>,
    pub kind: ChannelKind,
}

impl Channel {
    pub fn text(id: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            guild_id: Some(guild_id.into()),
            kind: ChannelKind::Text,
        }
    }

    pub fn direct(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            guild_id: None,
            kind: ChannelKind::Direct,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#{}", name),
            None => write!(f, "<#{}>", self.id),
        }
    }
}

/// A guild role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub guild_id: String,
    pub name: String,
}

impl Role {
    pub fn new(id: impl Into<String>, guild_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            guild_id: guild_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}
