//! Message dispatcher - Routes inbound messages and interactions to command handlers

use std::sync::Arc;
use tracing::{debug, warn};

use super::arguments::ArgumentResolver;
use super::middleware::CommandContext;
use super::parser::MessageParser;
use crate::application::container::Container;
use crate::application::errors::{ResolveError, RuntimeError};
use crate::domain::entities::{
    ArgumentValue, Interaction, InteractionInvocation, InteractionKind, Message, MessageInvocation, RegisteredCommand,
};

/// Why an inbound event was dropped without running anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SelfAuthored,
    BotAuthor,
    NotACommand,
    UnknownCommand,
    NoHandler,
    GuildOnly,
    NoApplicationCommand,
    Component,
}

/// Result of dispatching one inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Ignored(IgnoreReason),
    /// The pre-execution hook returned false
    Cancelled,
    /// Argument resolution failed and the error was sent back to the invoker
    Rejected(ResolveError),
    /// Handed to the component listener
    Forwarded,
    Executed { extension: String, command: String },
}

/// Routes inbound events through parsing, hooks and argument resolution
#[derive(Clone)]
pub struct MessageDispatcher {
    container: Arc<Container>,
    parser: MessageParser,
}

impl MessageDispatcher {
    pub fn new(container: Arc<Container>) -> Self {
        let parser = MessageParser::new(container.config().bot.prefixes.iter().cloned());
        Self { container, parser }
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Process a text message
    pub async fn dispatch_message(&self, message: Message) -> Result<DispatchOutcome, RuntimeError> {
        let bot = self.container.bot().bot_info();
        if message.author.id == bot.id {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::SelfAuthored));
        }
        if message.author.is_bot && self.container.config().bot.ignore_bots {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::BotAuthor));
        }

        let Some(parsed) = self.parser.parse(&message.content) else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::NotACommand));
        };

        let Some(mut command) = self.container.find_command(&parsed.name)? else {
            debug!(name = %parsed.name, "No command matches");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownCommand));
        };

        let mut args = parsed.args;
        if let Some(second) = args.first() {
            let joined = format!("{} {}", parsed.name, second);
            if let Some(sub) = self.container.find_text_command(&joined)? {
                debug!(command = %sub.id(), "Subcommand override");
                command = sub;
                args.remove(0);
            }
        }

        let Some(handler) = command.message_handler().cloned() else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::NoHandler));
        };

        if command.guild_only && !message.in_guild() {
            debug!(command = %command.id(), "Guild-only command used outside a guild");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::GuildOnly));
        }

        let ctx = CommandContext::from_message(&command.extension, command.command.clone(), &message);
        if !self.container.before_run(&ctx).await {
            debug!(command = %command.id(), "Cancelled by pre-execution hook");
            return Ok(DispatchOutcome::Cancelled);
        }

        let values = if command.arguments.is_empty() {
            args.into_iter().map(ArgumentValue::String).collect()
        } else {
            let resolver = ArgumentResolver::new(self.container.lookup().as_ref(), &message);
            match resolver.resolve(&command.arguments, &args).await {
                Ok(values) => values,
                Err(err) => {
                    debug!(command = %command.id(), error = %err, "Argument resolution failed");
                    if let Err(e) = self.container.bot().reply(&message, &err.to_string()).await {
                        warn!(error = %e, "Failed to send argument error");
                    }
                    return Ok(DispatchOutcome::Rejected(err));
                }
            }
        };

        debug!(command = %command.id(), "Running text command");
        handler
            .on_message(MessageInvocation {
                container: &self.container,
                extension: &command.extension,
                message: &message,
                args: values,
            })
            .await?;

        Ok(executed(&command))
    }

    /// Process a platform interaction
    pub async fn dispatch_interaction(&self, interaction: Interaction) -> Result<DispatchOutcome, RuntimeError> {
        if interaction.kind == InteractionKind::Component {
            return match self.container.component_listener() {
                Some(listener) => {
                    listener.on_component(&interaction).await?;
                    Ok(DispatchOutcome::Forwarded)
                }
                None => Ok(DispatchOutcome::Ignored(IgnoreReason::Component)),
            };
        }

        let Some(name) = interaction.command_name.as_deref() else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::NoApplicationCommand));
        };

        let Some(command) = self.container.find_application_command_owner(name)? else {
            debug!(name, "No command owns this application command");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownCommand));
        };

        let ctx = CommandContext::from_interaction(&command.extension, command.command.clone(), &interaction);
        if !self.container.before_run(&ctx).await {
            debug!(command = %command.id(), "Cancelled by pre-execution hook");
            return Ok(DispatchOutcome::Cancelled);
        }

        let invocation = InteractionInvocation {
            container: &self.container,
            extension: &command.extension,
            interaction: &interaction,
        };

        let ran = match interaction.kind {
            InteractionKind::ChatInput => match command.chat_input_handler() {
                Some(handler) => {
                    handler.on_chat_input(invocation).await?;
                    true
                }
                None => false,
            },
            InteractionKind::ContextMenu => match command.context_menu_handler() {
                Some(handler) => {
                    handler.on_context_menu(invocation).await?;
                    true
                }
                None => false,
            },
            InteractionKind::Autocomplete => match command.autocomplete_handler() {
                Some(handler) => {
                    handler.on_autocomplete(invocation).await?;
                    true
                }
                None => false,
            },
            InteractionKind::Component => false,
        };

        if !ran {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::NoHandler));
        }
        Ok(executed(&command))
    }
}

fn executed(command: &RegisteredCommand) -> DispatchOutcome {
    DispatchOutcome::Executed {
        extension: command.extension.clone(),
        command: command.name.clone(),
    }
}
