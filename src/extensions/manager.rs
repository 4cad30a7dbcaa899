//! Extension manager - registration, per-scope activation and cascading unload

use std::sync::Arc;
use tracing::{error, info, warn};

use super::loader::ExtensionLoader;
use crate::application::container::{Container, Stores};
use crate::application::errors::RuntimeError;
use crate::domain::entities::{
    ApplicationCommandEntry, EventId, Extension, ExtensionRecord, ExtensionScope, RegisteredCommand, RegisteredEvent,
    RegisteredTask, Scope,
};

/// Everything an unload removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnloadReport {
    pub extension: String,
    /// Scopes the extension was active in
    pub scopes: Vec<Scope>,
    pub commands: Vec<String>,
    pub events: Vec<String>,
    pub tasks: Vec<String>,
    pub application_commands: Vec<String>,
}

/// Result of one extension in a bulk operation
#[derive(Debug)]
pub struct ExtensionOutcome<T> {
    pub name: String,
    pub result: Result<T, RuntimeError>,
}

/// Listing entry
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionStatus {
    pub name: String,
    pub description: Option<String>,
    pub scope: ExtensionScope,
    pub active_in: Vec<Scope>,
    pub commands: usize,
    pub events: usize,
    pub tasks: usize,
}

/// Manages all extensions of one runtime
#[derive(Clone)]
pub struct ExtensionManager {
    container: Arc<Container>,
}

impl ExtensionManager {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    /// Register an extension and everything it declares
    pub fn register(&self, extension: Extension) -> Result<(), RuntimeError> {
        extension.validate()?;

        let name = extension.name.clone();
        let mut stores = self.container.stores_mut()?;
        if stores.extensions.contains(&name) {
            return Err(RuntimeError::DuplicateRegistration(format!("extension {}", name)));
        }

        for command in &extension.commands {
            if let Some(existing) = stores.commands.find(|c| c.extension != name && c.matches(&command.name)) {
                warn!(
                    command = %command.name,
                    shadowed_by = %existing.id(),
                    "Text command name already taken, earlier registration wins"
                );
            }
        }

        if let Err(e) = insert(&mut stores, extension) {
            purge(&mut stores, &name);
            return Err(e);
        }

        info!("Registered extension: {}", name);
        Ok(())
    }

    /// Activate an extension and its event subscriptions in `scope`
    pub fn activate(&self, name: &str, scope: &Scope) -> Result<(), RuntimeError> {
        let mut stores = self.container.stores_mut()?;
        let key = name.to_string();
        let record = stores
            .extensions
            .get(&key)
            .ok_or_else(|| RuntimeError::NotRegistered(format!("extension {}", name)))?;
        if !record.scope.allows(scope) {
            return Err(RuntimeError::ScopeNotAllowed {
                extension: name.to_string(),
                scope: scope.to_string(),
            });
        }

        stores.extension_scopes.load(&key, scope)?;

        let events = owned_event_ids(&stores, name);
        for (index, id) in events.iter().enumerate() {
            if let Err(e) = stores.event_scopes.load(id, scope) {
                error!(extension = name, event = %id, error = %e, "Activation failed, rolling back");
                for loaded in &events[..index] {
                    let _ = stores.event_scopes.unload(loaded, scope);
                }
                let _ = stores.extension_scopes.unload(&key, scope);
                return Err(e);
            }
        }

        info!(extension = name, scope = %scope, events = events.len(), "Extension activated");
        Ok(())
    }

    /// Mirror of [`activate`](Self::activate)
    pub fn deactivate(&self, name: &str, scope: &Scope) -> Result<(), RuntimeError> {
        let mut stores = self.container.stores_mut()?;
        stores.extension_scopes.unload(&name.to_string(), scope)?;

        // once-subscriptions that already fired are gone
        for id in owned_event_ids(&stores, name) {
            if stores.event_scopes.is_loaded(&id, scope) {
                stores.event_scopes.unload(&id, scope)?;
            }
        }

        info!(extension = name, scope = %scope, "Extension deactivated");
        Ok(())
    }

    /// Remove an extension and everything it owns, whatever its activation state
    pub fn unload(&self, name: &str) -> Result<UnloadReport, RuntimeError> {
        let mut stores = self.container.stores_mut()?;
        if !stores.extensions.contains(&name.to_string()) {
            return Err(RuntimeError::NotRegistered(format!("extension {}", name)));
        }

        let scopes = stores.extension_scopes.scopes_of(&name.to_string());
        let report = purge(&mut stores, name);
        info!(
            extension = name,
            commands = report.commands.len(),
            events = report.events.len(),
            "Extension unloaded"
        );
        Ok(UnloadReport { scopes, ..report })
    }

    /// Register everything the loader yields; one failure never stops the rest
    pub fn load_all(&self, loader: &dyn ExtensionLoader) -> Vec<ExtensionOutcome<()>> {
        loader
            .load()
            .into_iter()
            .map(|discovered| {
                let result = discovered.extension.and_then(|extension| self.register(extension));
                if let Err(e) = &result {
                    error!(extension = %discovered.name, error = %e, "Failed to load extension");
                }
                ExtensionOutcome {
                    name: discovered.name,
                    result,
                }
            })
            .collect()
    }

    /// Activate every extension that allows `scope` and is not active there yet
    pub fn activate_all(&self, scope: &Scope) -> Result<Vec<ExtensionOutcome<()>>, RuntimeError> {
        let candidates: Vec<String> = {
            let stores = self.container.stores()?;
            stores
                .extensions
                .filter(|r| r.scope.allows(scope) && !stores.extension_scopes.is_loaded(&r.name, scope))
                .map(|r| r.name.clone())
                .collect()
        };

        Ok(candidates
            .into_iter()
            .map(|name| {
                let result = self.activate(&name, scope);
                if let Err(e) = &result {
                    error!(extension = %name, error = %e, "Failed to activate extension");
                }
                ExtensionOutcome { name, result }
            })
            .collect())
    }

    pub fn unload_all(&self) -> Result<Vec<ExtensionOutcome<UnloadReport>>, RuntimeError> {
        let names = self.names()?;
        Ok(names
            .into_iter()
            .map(|name| {
                let result = self.unload(&name);
                if let Err(e) = &result {
                    error!(extension = %name, error = %e, "Failed to unload extension");
                }
                ExtensionOutcome { name, result }
            })
            .collect())
    }

    pub fn names(&self) -> Result<Vec<String>, RuntimeError> {
        Ok(self.container.stores()?.extensions.iter().map(|r| r.name.clone()).collect())
    }

    pub fn is_active(&self, name: &str, scope: &Scope) -> Result<bool, RuntimeError> {
        Ok(self.container.stores()?.extension_scopes.is_loaded(&name.to_string(), scope))
    }

    pub fn list(&self) -> Result<Vec<ExtensionStatus>, RuntimeError> {
        let stores = self.container.stores()?;
        Ok(stores
            .extensions
            .iter()
            .map(|record| ExtensionStatus {
                name: record.name.clone(),
                description: record.description.clone(),
                scope: record.scope.clone(),
                active_in: stores.extension_scopes.scopes_of(&record.name),
                commands: stores.commands.filter(|c| c.extension == record.name).count(),
                events: stores.events.filter(|e| e.extension == record.name).count(),
                tasks: stores.tasks.filter(|t| t.extension == record.name).count(),
            })
            .collect())
    }

    /// Scheduled tasks declared by `extension`
    pub fn tasks(&self, extension: &str) -> Result<Vec<RegisteredTask>, RuntimeError> {
        Ok(self
            .container
            .stores()?
            .tasks
            .filter(|t| t.extension == extension)
            .cloned()
            .collect())
    }
}

fn owned_event_ids(stores: &Stores, extension: &str) -> Vec<EventId> {
    stores
        .events
        .filter(|e| e.extension == extension)
        .map(RegisteredEvent::id)
        .collect()
}

fn insert(stores: &mut Stores, extension: Extension) -> Result<(), RuntimeError> {
    let name = extension.name.clone();
    stores.extensions.add(ExtensionRecord::from(&extension))?;
    stores.extension_scopes.register(name.clone())?;

    for command in extension.commands {
        for descriptor in &command.application_commands {
            stores.application_commands.add(ApplicationCommandEntry {
                extension: name.clone(),
                command: command.name.clone(),
                descriptor: descriptor.clone(),
            })?;
        }
        stores.commands.add(RegisteredCommand::new(&name, command))?;
    }

    for event in extension.events {
        let registered = RegisteredEvent::new(&name, event);
        stores.event_scopes.register(registered.id())?;
        stores.events.add(registered)?;
    }

    for task in extension.tasks {
        stores.tasks.add(RegisteredTask::new(&name, task))?;
    }

    Ok(())
}

/// Drop every trace of `extension` from every store
fn purge(stores: &mut Stores, extension: &str) -> UnloadReport {
    let key = extension.to_string();
    stores.extensions.remove(|r| r.name == extension);
    stores.extension_scopes.unregister(&key);

    let commands = stores.commands.remove_all(|c| c.extension == extension);
    let events = stores.events.remove_all(|e| e.extension == extension);
    for event in &events {
        stores.event_scopes.unregister(&event.id());
    }
    let tasks = stores.tasks.remove_all(|t| t.extension == extension);
    let application_commands = stores.application_commands.remove_all(|a| a.extension == extension);

    UnloadReport {
        extension: key,
        scopes: Vec::new(),
        commands: commands.into_iter().map(|c| c.name.clone()).collect(),
        events: events.into_iter().map(|e| e.event.name.clone()).collect(),
        tasks: tasks.into_iter().map(|t| t.task.name.clone()).collect(),
        application_commands: application_commands.into_iter().map(|a| a.descriptor.name).collect(),
    }
}
