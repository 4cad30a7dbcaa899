use super::{Channel, Guild, Member, User};

/// Kind of platform interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Autocomplete,
    ChatInput,
    ContextMenu,
    /// Buttons and select menus, owned by the component listener
    Component,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Autocomplete => "autocomplete",
            InteractionKind::ChatInput => "chat-input",
            InteractionKind::ContextMenu => "context-menu",
            InteractionKind::Component => "component",
        }
    }
}

/// A structured interaction delivered by the platform
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    pub kind: InteractionKind,
    /// Name of the external command this interaction targets
    pub command_name: Option<String>,
    /// Component identifier, for component interactions
    pub custom_id: Option<String>,
    /// Target user or message of a context-menu command
    pub target_id: Option<String>,
    pub user: User,
    pub member: Option<Member>,
    pub guild: Option<Guild>,
    pub channel: Option<Channel>,
    pub options: serde_json::Value,
}

impl Interaction {
    pub fn new(kind: InteractionKind, user: User) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            command_name: None,
            custom_id: None,
            target_id: None,
            user,
            member: None,
            guild: None,
            channel: None,
            options: serde_json::Value::Null,
        }
    }

    pub fn command(kind: InteractionKind, name: impl Into<String>, user: User) -> Self {
        let mut interaction = Self::new(kind, user);
        interaction.command_name = Some(name.into());
        interaction
    }

    pub fn component(custom_id: impl Into<String>, user: User) -> Self {
        let mut interaction = Self::new(InteractionKind::Component, user);
        interaction.custom_id = Some(custom_id.into());
        interaction
    }

    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild.as_ref().map(|g| g.id.as_str())
    }
}
