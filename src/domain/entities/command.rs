use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::{ApplicationCommandDescriptor, ArgumentValue, CommandArgument, Interaction, Message};
use crate::application::container::Container;
use crate::application::errors::{CommandError, RuntimeError};

/// Everything a text handler receives
pub struct MessageInvocation<'a> {
    pub container: &'a Arc<Container>,
    pub extension: &'a str,
    pub message: &'a Message,
    pub args: Vec<ArgumentValue>,
}

/// Everything an interaction handler receives
pub struct InteractionInvocation<'a> {
    pub container: &'a Arc<Container>,
    pub extension: &'a str,
    pub interaction: &'a Interaction,
}

/// Handler for prefix-triggered text commands
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, invocation: MessageInvocation<'_>) -> Result<(), CommandError>;
}

/// Handler for slash command invocations
#[async_trait]
pub trait ChatInputHandler: Send + Sync {
    async fn on_chat_input(&self, invocation: InteractionInvocation<'_>) -> Result<(), CommandError>;
}

/// Handler for context-menu invocations
#[async_trait]
pub trait ContextMenuHandler: Send + Sync {
    async fn on_context_menu(&self, invocation: InteractionInvocation<'_>) -> Result<(), CommandError>;
}

/// Handler for slash option autocompletion
#[async_trait]
pub trait AutocompleteHandler: Send + Sync {
    async fn on_autocomplete(&self, invocation: InteractionInvocation<'_>) -> Result<(), CommandError>;
}

/// Represents a bot command declared by an extension
pub struct Command {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub arguments: Vec<CommandArgument>,
    pub guild_only: bool,
    pub permissions: Vec<String>,
    pub values: HashMap<String, serde_json::Value>,
    pub application_commands: Vec<ApplicationCommandDescriptor>,
    on_message: Option<Arc<dyn MessageHandler>>,
    on_chat_input: Option<Arc<dyn ChatInputHandler>>,
    on_context_menu: Option<Arc<dyn ContextMenuHandler>>,
    on_autocomplete: Option<Arc<dyn AutocompleteHandler>>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "No description provided".to_string(),
            aliases: Vec::new(),
            arguments: Vec::new(),
            guild_only: false,
            permissions: Vec::new(),
            values: HashMap::new(),
            application_commands: Vec::new(),
            on_message: None,
            on_chat_input: None,
            on_context_menu: None,
            on_autocomplete: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_argument(mut self, argument: CommandArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_application_command(mut self, descriptor: ApplicationCommandDescriptor) -> Self {
        self.application_commands.push(descriptor);
        self
    }

    pub fn on_message(mut self, handler: impl MessageHandler + 'static) -> Self {
        self.on_message = Some(Arc::new(handler));
        self
    }

    pub fn on_chat_input(mut self, handler: impl ChatInputHandler + 'static) -> Self {
        self.on_chat_input = Some(Arc::new(handler));
        self
    }

    pub fn on_context_menu(mut self, handler: impl ContextMenuHandler + 'static) -> Self {
        self.on_context_menu = Some(Arc::new(handler));
        self
    }

    pub fn on_autocomplete(mut self, handler: impl AutocompleteHandler + 'static) -> Self {
        self.on_autocomplete = Some(Arc::new(handler));
        self
    }

    pub fn message_handler(&self) -> Option<&Arc<dyn MessageHandler>> {
        self.on_message.as_ref()
    }

    pub fn chat_input_handler(&self) -> Option<&Arc<dyn ChatInputHandler>> {
        self.on_chat_input.as_ref()
    }

    pub fn context_menu_handler(&self) -> Option<&Arc<dyn ContextMenuHandler>> {
        self.on_context_menu.as_ref()
    }

    pub fn autocomplete_handler(&self) -> Option<&Arc<dyn AutocompleteHandler>> {
        self.on_autocomplete.as_ref()
    }

    /// Exact match on the name or any alias
    pub fn matches(&self, input: &str) -> bool {
        self.name == input || self.aliases.iter().any(|a| a == input)
    }

    /// Names of the external commands this command produced
    pub fn application_command_names(&self) -> impl Iterator<Item = &str> {
        self.application_commands.iter().map(|d| d.name.as_str())
    }

    pub fn owns_application_command(&self, name: &str) -> bool {
        self.application_command_names().any(|n| n == name)
    }

    /// Checks the argument schema and external descriptors at load time
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let invalid = |reason: String| RuntimeError::InvalidSchema {
            command: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("command name is empty".to_string()));
        }

        let last = self.arguments.len().saturating_sub(1);
        let mut seen = HashSet::new();
        for (index, arg) in self.arguments.iter().enumerate() {
            if !seen.insert(arg.name.as_str()) {
                return Err(invalid(format!("argument \"{}\" is declared twice", arg.name)));
            }
            if arg.is_rest() && index != last {
                return Err(invalid(format!(
                    "rest argument \"{}\" must be the last argument",
                    arg.name
                )));
            }
            if let Some(default) = &arg.default {
                if !default.fits(arg.kind) {
                    return Err(invalid(format!(
                        "default of argument \"{}\" does not match type \"{}\"",
                        arg.name, arg.kind
                    )));
                }
            }
            if !arg.choices.is_empty() && arg.kind != super::ArgumentType::String {
                return Err(invalid(format!(
                    "choices are only allowed on string arguments, \"{}\" is \"{}\"",
                    arg.name, arg.kind
                )));
            }
        }

        let mut names = HashSet::new();
        for descriptor in &self.application_commands {
            if descriptor.name.trim().is_empty() {
                return Err(invalid("application command name is empty".to_string()));
            }
            if !names.insert(descriptor.name.as_str()) {
                return Err(invalid(format!(
                    "application command \"{}\" is declared twice",
                    descriptor.name
                )));
            }
            if descriptor.is_context_menu() && !descriptor.options.is_empty() {
                return Err(invalid(format!(
                    "context menu \"{}\" cannot declare options",
                    descriptor.name
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arguments", &self.arguments)
            .field("guild_only", &self.guild_only)
            .field("application_commands", &self.application_commands)
            .field("on_message", &self.on_message.is_some())
            .field("on_chat_input", &self.on_chat_input.is_some())
            .field("on_context_menu", &self.on_context_menu.is_some())
            .field("on_autocomplete", &self.on_autocomplete.is_some())
            .finish()
    }
}

/// Identity of a registered command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandId {
    pub extension: String,
    pub name: String,
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.extension, self.name)
    }
}

/// A command tagged with its owning extension
#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    pub extension: String,
    pub command: Arc<Command>,
}

impl RegisteredCommand {
    pub fn new(extension: impl Into<String>, command: Command) -> Self {
        Self {
            extension: extension.into(),
            command: Arc::new(command),
        }
    }

    pub fn id(&self) -> CommandId {
        CommandId {
            extension: self.extension.clone(),
            name: self.command.name.clone(),
        }
    }
}

impl std::ops::Deref for RegisteredCommand {
    type Target = Command;

    fn deref(&self) -> &Command {
        &self.command
    }
}

/// A descriptor tagged with the command and extension that produced it
#[derive(Debug, Clone)]
pub struct ApplicationCommandEntry {
    pub extension: String,
    pub command: String,
    pub descriptor: ApplicationCommandDescriptor,
}
