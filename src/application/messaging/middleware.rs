//! Pre-execution hooks run before any command handler

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{Channel, Command, Guild, Interaction, Member, Message, User};
use crate::infrastructure::config::Config;

/// Context passed to the pre-execution hook
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub command: Arc<Command>,
    pub extension: String,
    pub guild: Option<Guild>,
    pub member: Option<Member>,
    pub user: User,
    pub channel: Option<Channel>,
    pub message: Option<Message>,
    pub interaction: Option<Interaction>,
}

impl CommandContext {
    pub fn from_message(extension: impl Into<String>, command: Arc<Command>, message: &Message) -> Self {
        Self {
            command,
            extension: extension.into(),
            guild: message.guild.clone(),
            member: message.member.clone(),
            user: message.author.clone(),
            channel: Some(message.channel.clone()),
            message: Some(message.clone()),
            interaction: None,
        }
    }

    pub fn from_interaction(extension: impl Into<String>, command: Arc<Command>, interaction: &Interaction) -> Self {
        Self {
            command,
            extension: extension.into(),
            guild: interaction.guild.clone(),
            member: interaction.member.clone(),
            user: interaction.user.clone(),
            channel: interaction.channel.clone(),
            message: None,
            interaction: Some(interaction.clone()),
        }
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild.as_ref().map(|g| g.id.as_str())
    }
}

/// Hook deciding whether a matched command may run. `false` cancels silently.
#[async_trait]
pub trait BeforeCommandRun: Send + Sync {
    async fn before_run(&self, ctx: &CommandContext) -> bool;
}

#[async_trait]
impl<F> BeforeCommandRun for F
where
    F: Fn(&CommandContext) -> bool + Send + Sync,
{
    async fn before_run(&self, ctx: &CommandContext) -> bool {
        self(ctx)
    }
}

/// Ordered hooks, the first `false` wins
#[derive(Default, Clone)]
pub struct HookChain {
    hooks: Vec<Arc<dyn BeforeCommandRun>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<H: BeforeCommandRun + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[async_trait]
impl BeforeCommandRun for HookChain {
    async fn before_run(&self, ctx: &CommandContext) -> bool {
        for hook in &self.hooks {
            if !hook.before_run(ctx).await {
                return false;
            }
        }
        true
    }
}

/// Restricts commands whose values carry `owner_only: true` to the bot owners
pub struct OwnerOnly {
    owners: Vec<String>,
}

impl OwnerOnly {
    pub fn new<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owners: owners.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bot.owners.iter().cloned())
    }
}

#[async_trait]
impl BeforeCommandRun for OwnerOnly {
    async fn before_run(&self, ctx: &CommandContext) -> bool {
        let owner_only = ctx
            .command
            .values
            .get("owner_only")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !owner_only {
            return true;
        }

        let allowed = self.owners.iter().any(|o| o == &ctx.user.id);
        if !allowed {
            debug!(command = %ctx.command.name, user = %ctx.user.id, "Owner-only command refused");
        }
        allowed
    }
}

/// Requires the invoking member to hold every permission the command lists
pub struct RequiredPermissions;

#[async_trait]
impl BeforeCommandRun for RequiredPermissions {
    async fn before_run(&self, ctx: &CommandContext) -> bool {
        let required = &ctx.command.permissions;
        if required.is_empty() {
            return true;
        }

        let allowed = match &ctx.member {
            Some(member) => required.iter().all(|p| member.has_permission(p)),
            None => false,
        };
        if !allowed {
            debug!(command = %ctx.command.name, user = %ctx.user.id, "Missing required permissions");
        }
        allowed
    }
}
