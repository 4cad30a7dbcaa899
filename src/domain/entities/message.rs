use super::{Channel, Guild, Member, User};
use chrono::{DateTime, Utc};

/// Represents an incoming text message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel: Channel,
    pub guild: Option<Guild>,
    pub author: User,
    pub member: Option<Member>,
    pub content: String,
    /// Id of the message this one replies to
    pub reference: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel: Channel, author: User, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel,
            guild: None,
            author,
            member: None,
            content: content.into(),
            reference: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    pub fn replying_to(mut self, message_id: impl Into<String>) -> Self {
        self.reference = Some(message_id.into());
        self
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild.as_ref().map(|g| g.id.as_str())
    }

    pub fn in_guild(&self) -> bool {
        self.guild.is_some()
    }
}
