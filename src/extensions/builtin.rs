//! Built-in `core` extension: help, ping, version

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::{
    ApplicationCommandDescriptor, ChatInputHandler, Command, CommandArgument, Extension, InteractionInvocation,
    MessageHandler, MessageInvocation,
};

pub const CORE_EXTENSION: &str = "core";

pub fn core_extension() -> Extension {
    Extension::new(CORE_EXTENSION)
        .with_description("Built-in commands")
        .with_command(
            Command::new("help")
                .with_description("Show help message")
                .with_aliases(["h", "commands"])
                .with_argument(CommandArgument::string("command").optional())
                .on_message(Help),
        )
        .with_command(
            Command::new("ping")
                .with_description("Check that the bot is alive")
                .with_application_command(ApplicationCommandDescriptor::slash("ping", "Check that the bot is alive"))
                .on_message(Ping)
                .on_chat_input(Ping),
        )
        .with_command(
            Command::new("version")
                .with_description("Show runtime version")
                .on_message(Version),
        )
}

fn version_text() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

struct Help;

#[async_trait]
impl MessageHandler for Help {
    async fn on_message(&self, invocation: MessageInvocation<'_>) -> Result<(), CommandError> {
        let container = invocation.container;
        let prefix = container
            .config()
            .bot
            .prefixes
            .first()
            .cloned()
            .unwrap_or_default();
        let commands = container
            .commands()
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        let text = match invocation.args.first().and_then(|v| v.as_str()) {
            Some(name) => match commands.iter().find(|c| c.matches(name) && c.message_handler().is_some()) {
                Some(cmd) => {
                    let mut help = format!("{}{} - {}", prefix, cmd.name, cmd.description);
                    if !cmd.aliases.is_empty() {
                        help.push_str(&format!("\nAliases: {}", cmd.aliases.join(", ")));
                    }
                    if !cmd.arguments.is_empty() {
                        let usage: Vec<String> = cmd
                            .arguments
                            .iter()
                            .map(|a| {
                                if a.required {
                                    format!("<{}:{}>", a.name, a.expected())
                                } else {
                                    format!("[{}:{}]", a.name, a.expected())
                                }
                            })
                            .collect();
                        help.push_str(&format!("\nUsage: {}{} {}", prefix, cmd.name, usage.join(" ")));
                    }
                    help
                }
                None => format!("Command {}{} not found", prefix, name),
            },
            None => {
                let mut help = "Available commands:".to_string();
                for cmd in commands.iter().filter(|c| c.message_handler().is_some()) {
                    help.push_str(&format!("\n  {}{} - {}", prefix, cmd.name, cmd.description));
                }
                help
            }
        };

        container.bot().reply(invocation.message, &text).await?;
        Ok(())
    }
}

struct Ping;

#[async_trait]
impl MessageHandler for Ping {
    async fn on_message(&self, invocation: MessageInvocation<'_>) -> Result<(), CommandError> {
        invocation.container.bot().reply(invocation.message, "Pong!").await?;
        Ok(())
    }
}

#[async_trait]
impl ChatInputHandler for Ping {
    async fn on_chat_input(&self, invocation: InteractionInvocation<'_>) -> Result<(), CommandError> {
        invocation
            .container
            .bot()
            .respond(invocation.interaction, "Pong!")
            .await?;
        Ok(())
    }
}

struct Version;

#[async_trait]
impl MessageHandler for Version {
    async fn on_message(&self, invocation: MessageInvocation<'_>) -> Result<(), CommandError> {
        invocation.container.bot().reply(invocation.message, &version_text()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_extension_is_valid() {
        let ext = core_extension();
        assert!(ext.validate().is_ok());
        assert_eq!(ext.commands.len(), 3);
        assert!(ext.commands.iter().any(|c| c.owns_application_command("ping")));
    }
}
