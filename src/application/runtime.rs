//! Runtime - one independent instance of the extension runtime

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::container::Container;
use crate::application::errors::RuntimeError;
use crate::application::messaging::{EventDispatcher, MessageDispatcher};
use crate::application::services::{CommandReconciler, ReconcileReport};
use crate::domain::entities::Scope;
use crate::extensions::{ExtensionLoader, ExtensionManager, ExtensionOutcome, UnloadReport};

/// What `start` did
#[derive(Debug)]
pub struct StartReport {
    pub loaded: Vec<ExtensionOutcome<()>>,
    pub activated: Vec<ExtensionOutcome<()>>,
    pub reconciled: Option<ReconcileReport>,
}

/// Bundles every component around one container
pub struct Runtime {
    container: Arc<Container>,
    extensions: ExtensionManager,
    dispatcher: MessageDispatcher,
    events: EventDispatcher,
    reconciler: CommandReconciler,
}

impl Runtime {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            extensions: ExtensionManager::new(container.clone()),
            dispatcher: MessageDispatcher::new(container.clone()),
            events: EventDispatcher::new(container.clone()),
            reconciler: CommandReconciler::new(container.clone()),
            container,
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn extensions(&self) -> &ExtensionManager {
        &self.extensions
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn reconciler(&self) -> &CommandReconciler {
        &self.reconciler
    }

    /// Scope application commands are published into
    pub fn publish_scope(&self) -> Scope {
        self.reconciler.publish_scope()
    }

    /// Load every extension, activate globally scoped ones and publish commands, as configured
    pub async fn start(&self, loader: &dyn ExtensionLoader) -> Result<StartReport, RuntimeError> {
        let config = self.container.config();
        let loaded = self.extensions.load_all(loader);

        let activated = if config.extensions.auto_activate {
            self.extensions.activate_all(&Scope::Global)?
        } else {
            Vec::new()
        };

        let reconciled = if config.commands.auto_register {
            Some(self.publish().await?)
        } else {
            None
        };

        info!(
            loaded = loaded.iter().filter(|o| o.result.is_ok()).count(),
            failed = loaded.iter().filter(|o| o.result.is_err()).count(),
            activated = activated.iter().filter(|o| o.result.is_ok()).count(),
            "Runtime started"
        );

        Ok(StartReport {
            loaded,
            activated,
            reconciled,
        })
    }

    /// Publish globally active commands into the configured scope
    pub async fn publish(&self) -> Result<ReconcileReport, RuntimeError> {
        self.reconciler.reconcile(&self.publish_scope()).await
    }

    /// Unload an extension and prune its application commands from every scope they were published in.
    /// The extension is gone either way; a failed prune is logged.
    pub async fn unload_extension(&self, name: &str) -> Result<UnloadReport, RuntimeError> {
        let report = self.extensions.unload(name)?;
        if report.application_commands.is_empty() {
            return Ok(report);
        }

        let publish = self.publish_scope();
        let mut targets: Vec<Scope> = Vec::new();
        let active = report.scopes.iter().map(|scope| match scope {
            Scope::Global => publish.clone(),
            guild => guild.clone(),
        });
        let published = self.container.config().commands.auto_register.then(|| publish.clone());
        for target in active.chain(published) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }

        for target in &targets {
            if let Err(e) = self.reconciler.reconcile(target).await {
                warn!(extension = name, scope = %target, error = %e, "Failed to prune application commands");
            }
        }
        Ok(report)
    }

    /// Unload everything, best-effort
    pub fn shutdown(&self) -> Result<Vec<ExtensionOutcome<UnloadReport>>, RuntimeError> {
        let outcomes = self.extensions.unload_all()?;
        info!(extensions = outcomes.len(), "Runtime shut down");
        Ok(outcomes)
    }
}
