//! Composition root - one explicit owner of every registry and collaborator

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::application::errors::{CommandError, RuntimeError};
use crate::application::messaging::middleware::{BeforeCommandRun, CommandContext};
use crate::domain::entities::{
    ApplicationCommandEntry, EventId, ExtensionRecord, Interaction, RegisteredCommand, RegisteredEvent,
    RegisteredTask, ScopeState,
};
use crate::domain::registry::Registry;
use crate::domain::traits::{ApplicationCommandClient, Bot, EntityLookup};
use crate::infrastructure::config::Config;

/// Per-guild plugin enablement predicate
#[async_trait]
pub trait PluginFilter: Send + Sync {
    async fn is_enabled(&self, extension: &str, guild_id: &str) -> bool;
}

/// Receives message-component interactions (buttons, menus, pagination)
#[async_trait]
pub trait ComponentListener: Send + Sync {
    async fn on_component(&self, interaction: &Interaction) -> Result<(), CommandError>;
}

/// Every registry the lifecycle manager writes and the routers read
#[derive(Debug, Default)]
pub struct Stores {
    pub extensions: Registry<ExtensionRecord>,
    pub extension_scopes: ScopeState<String>,
    pub commands: Registry<RegisteredCommand>,
    pub events: Registry<RegisteredEvent>,
    pub event_scopes: ScopeState<EventId>,
    pub tasks: Registry<RegisteredTask>,
    pub application_commands: Registry<ApplicationCommandEntry>,
}

/// Shared state of one runtime instance
pub struct Container {
    config: Arc<Config>,
    stores: RwLock<Stores>,
    bot: Arc<dyn Bot>,
    lookup: Arc<dyn EntityLookup>,
    commands_client: Arc<dyn ApplicationCommandClient>,
    before_run: Option<Arc<dyn BeforeCommandRun>>,
    plugin_filter: Arc<dyn PluginFilter>,
    component_listener: Option<Arc<dyn ComponentListener>>,
}

impl Container {
    pub fn builder(
        bot: Arc<dyn Bot>,
        lookup: Arc<dyn EntityLookup>,
        commands_client: Arc<dyn ApplicationCommandClient>,
    ) -> ContainerBuilder {
        ContainerBuilder {
            config: Config::default(),
            bot,
            lookup,
            commands_client,
            before_run: None,
            plugin_filter: None,
            component_listener: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bot(&self) -> &Arc<dyn Bot> {
        &self.bot
    }

    pub fn lookup(&self) -> &Arc<dyn EntityLookup> {
        &self.lookup
    }

    pub fn commands_client(&self) -> &Arc<dyn ApplicationCommandClient> {
        &self.commands_client
    }

    pub fn component_listener(&self) -> Option<&Arc<dyn ComponentListener>> {
        self.component_listener.as_ref()
    }

    pub fn stores(&self) -> Result<RwLockReadGuard<'_, Stores>, RuntimeError> {
        self.stores
            .read()
            .map_err(|_| RuntimeError::Internal("Lock poisoned".to_string()))
    }

    pub fn stores_mut(&self) -> Result<RwLockWriteGuard<'_, Stores>, RuntimeError> {
        self.stores
            .write()
            .map_err(|_| RuntimeError::Internal("Lock poisoned".to_string()))
    }

    /// First registered command, in registration order, matching a name or alias
    pub fn find_command(&self, name: &str) -> Result<Option<RegisteredCommand>, RuntimeError> {
        Ok(self.stores()?.commands.find(|c| c.matches(name)).cloned())
    }

    /// Like `find_command`, restricted to commands with a text handler
    pub fn find_text_command(&self, name: &str) -> Result<Option<RegisteredCommand>, RuntimeError> {
        Ok(self
            .stores()?
            .commands
            .find(|c| c.matches(name) && c.message_handler().is_some())
            .cloned())
    }

    /// The command that produced the external command `name`
    pub fn find_application_command_owner(&self, name: &str) -> Result<Option<RegisteredCommand>, RuntimeError> {
        Ok(self
            .stores()?
            .commands
            .find(|c| c.owns_application_command(name))
            .cloned())
    }

    pub fn commands(&self) -> Result<Vec<RegisteredCommand>, RuntimeError> {
        Ok(self.stores()?.commands.iter().cloned().collect())
    }

    /// Runs the pre-execution hook; no hook means proceed
    pub async fn before_run(&self, ctx: &CommandContext) -> bool {
        match &self.before_run {
            Some(hook) => hook.before_run(ctx).await,
            None => true,
        }
    }

    pub async fn is_plugin_enabled(&self, extension: &str, guild_id: &str) -> bool {
        self.plugin_filter.is_enabled(extension, guild_id).await
    }
}

/// Builder for [`Container`]
pub struct ContainerBuilder {
    config: Config,
    bot: Arc<dyn Bot>,
    lookup: Arc<dyn EntityLookup>,
    commands_client: Arc<dyn ApplicationCommandClient>,
    before_run: Option<Arc<dyn BeforeCommandRun>>,
    plugin_filter: Option<Arc<dyn PluginFilter>>,
    component_listener: Option<Arc<dyn ComponentListener>>,
}

impl ContainerBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn before_run(mut self, hook: impl BeforeCommandRun + 'static) -> Self {
        self.before_run = Some(Arc::new(hook));
        self
    }

    /// Overrides the config-driven `extensions.disabled` filter
    pub fn plugin_filter(mut self, filter: impl PluginFilter + 'static) -> Self {
        self.plugin_filter = Some(Arc::new(filter));
        self
    }

    pub fn component_listener(mut self, listener: impl ComponentListener + 'static) -> Self {
        self.component_listener = Some(Arc::new(listener));
        self
    }

    pub fn build(self) -> Arc<Container> {
        let config = Arc::new(self.config);
        let plugin_filter = self
            .plugin_filter
            .unwrap_or_else(|| config.clone() as Arc<dyn PluginFilter>);

        Arc::new(Container {
            config,
            stores: RwLock::new(Stores::default()),
            bot: self.bot,
            lookup: self.lookup,
            commands_client: self.commands_client,
            before_run: self.before_run,
            plugin_filter,
            component_listener: self.component_listener,
        })
    }
}
