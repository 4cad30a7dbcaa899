//! Descriptors for platform-native (slash and context-menu) commands

use serde::{Deserialize, Serialize};

/// Kind of externally registered command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationCommandKind {
    ChatInput,
    User,
    Message,
}

/// Where the application is installed for the command to be available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationType {
    GuildInstall,
    UserInstall,
}

/// Where the command may be invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionContext {
    Guild,
    BotDm,
    PrivateChannel,
}

/// Option value type of a slash command option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    SubCommand,
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: serde_json::Value,
}

/// A slash command option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub autocomplete: bool,
}

impl CommandOption {
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            autocomplete: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choice(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_length(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }
}

/// One externally registered command as pushed to the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCommandDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ApplicationCommandKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    pub default_member_permissions: Option<String>,
    pub integration_types: Vec<IntegrationType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<InteractionContext>,
    #[serde(default)]
    pub nsfw: bool,
}

impl ApplicationCommandDescriptor {
    fn new(kind: ApplicationCommandKind, name: impl Into<String>, description: String) -> Self {
        Self {
            name: name.into(),
            kind,
            description,
            options: Vec::new(),
            default_member_permissions: None,
            integration_types: vec![IntegrationType::GuildInstall],
            contexts: Vec::new(),
            nsfw: false,
        }
    }

    pub fn slash(name: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        let description = if description.is_empty() {
            "No description".to_string()
        } else {
            description
        };
        Self::new(ApplicationCommandKind::ChatInput, name, description)
    }

    pub fn user_context(name: impl Into<String>) -> Self {
        Self::new(ApplicationCommandKind::User, name, String::new())
    }

    pub fn message_context(name: impl Into<String>) -> Self {
        Self::new(ApplicationCommandKind::Message, name, String::new())
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Permission bitfield required by default, as the platform's decimal string
    pub fn with_default_permissions(mut self, bits: u64) -> Self {
        self.default_member_permissions = Some(bits.to_string());
        self
    }

    pub fn with_integration_types(mut self, types: Vec<IntegrationType>) -> Self {
        self.integration_types = types;
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<InteractionContext>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    pub fn is_context_menu(&self) -> bool {
        self.kind != ApplicationCommandKind::ChatInput
    }
}

/// A command as currently registered on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveCommand {
    pub id: String,
    pub name: String,
}
