//! Command tree reconciler - keeps the platform's application commands in sync

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::container::Container;
use crate::application::errors::{GatewayError, RuntimeError};
use crate::domain::entities::{ApplicationCommandDescriptor, Scope};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub scope: Scope,
    /// Names sent in the bulk set, in order
    pub pushed: Vec<String>,
    /// Stale live commands that were deleted
    pub deleted: Vec<String>,
    /// Stale live commands whose deletion failed
    pub failed: Vec<(String, GatewayError)>,
}

pub struct CommandReconciler {
    container: Arc<Container>,
}

impl CommandReconciler {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    /// Scope the globally active set is published into: the development guild when configured
    pub fn publish_scope(&self) -> Scope {
        match &self.container.config().commands.guild_id {
            Some(guild_id) => Scope::guild(guild_id.clone()),
            None => Scope::Global,
        }
    }

    /// Scopes whose active commands belong in `target`.
    /// The development guild carries the global set next to its own.
    pub fn sources(&self, target: &Scope) -> Vec<Scope> {
        let publish = self.publish_scope();
        if *target == publish && publish != Scope::Global {
            vec![Scope::Global, publish]
        } else {
            vec![target.clone()]
        }
    }

    /// Descriptors of every extension active in `scope`, in registration order
    pub fn desired(&self, scope: &Scope) -> Result<Vec<ApplicationCommandDescriptor>, RuntimeError> {
        self.desired_in(std::slice::from_ref(scope))
    }

    /// Descriptors active in any of `scopes`; names must be unique across all of them
    pub fn desired_in(&self, scopes: &[Scope]) -> Result<Vec<ApplicationCommandDescriptor>, RuntimeError> {
        let stores = self.container.stores()?;
        let mut names = HashSet::new();
        let mut desired = Vec::new();

        for entry in stores.application_commands.filter(|e| {
            scopes
                .iter()
                .any(|scope| stores.extension_scopes.is_loaded(&e.extension, scope))
        }) {
            if !names.insert(entry.descriptor.name.as_str()) {
                return Err(RuntimeError::DuplicateRegistration(format!(
                    "application command {} ({})",
                    entry.descriptor.name, entry.extension
                )));
            }
            desired.push(entry.descriptor.clone());
        }

        Ok(desired)
    }

    /// Sync `target` with the commands that belong in it
    pub async fn reconcile(&self, target: &Scope) -> Result<ReconcileReport, RuntimeError> {
        self.reconcile_from(&self.sources(target), target).await
    }

    /// Publish the commands active in `sources` into `target`, deleting every other live command there
    pub async fn reconcile_from(&self, sources: &[Scope], target: &Scope) -> Result<ReconcileReport, RuntimeError> {
        let desired = self.desired_in(sources)?;
        let client = self.container.commands_client();
        let live = client.fetch_commands(target).await?;

        let wanted: HashSet<&str> = desired.iter().map(|d| d.name.as_str()).collect();
        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for stale in live.iter().filter(|c| !wanted.contains(c.name.as_str())) {
            match client.delete_command(target, &stale.id).await {
                Ok(()) => deleted.push(stale.name.clone()),
                Err(e) => {
                    warn!(scope = %target, command = %stale.name, error = %e, "Failed to delete stale command");
                    failed.push((stale.name.clone(), e));
                }
            }
        }

        client.set_commands(target, &desired).await?;
        let pushed: Vec<String> = desired.into_iter().map(|d| d.name).collect();
        info!(
            scope = %target,
            pushed = pushed.len(),
            deleted = deleted.len(),
            failed = failed.len(),
            "Application commands reconciled"
        );

        Ok(ReconcileReport {
            scope: target.clone(),
            pushed,
            deleted,
            failed,
        })
    }

    /// Remove every application command in `scope`
    pub async fn clear(&self, scope: &Scope) -> Result<(), RuntimeError> {
        self.container.commands_client().set_commands(scope, &[]).await?;
        info!(scope = %scope, "Application commands cleared");
        Ok(())
    }
}
