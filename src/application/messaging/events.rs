//! Event fan-out to activated subscriptions

use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::container::Container;
use crate::application::errors::RuntimeError;
use crate::domain::entities::{EventId, EventInvocation, EventPayload, RegisteredEvent, Scope};

/// What happened to one emitted event
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmitReport {
    pub delivered: Vec<EventId>,
    /// Disabled for the payload's guild
    pub skipped: Vec<EventId>,
    pub failed: Vec<(EventId, String)>,
}

/// Delivers platform events to every subscription active for them
#[derive(Clone)]
pub struct EventDispatcher {
    container: Arc<Container>,
}

impl EventDispatcher {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    pub async fn emit(&self, payload: EventPayload) -> Result<EmitReport, RuntimeError> {
        let mut report = EmitReport::default();

        for (subscription, scope) in self.targets(&payload)? {
            let id = subscription.id();

            if scope == Scope::Global {
                if let Some(guild_id) = payload.guild_id.as_deref() {
                    if !self.container.is_plugin_enabled(&subscription.extension, guild_id).await {
                        debug!(event = %id, guild = guild_id, "Extension disabled in guild");
                        report.skipped.push(id);
                        continue;
                    }
                }
            }

            if subscription.event.once {
                // a concurrent emit may already have claimed it
                let claimed = {
                    let mut stores = self.container.stores_mut()?;
                    stores.event_scopes.unload(&id, &scope).is_ok()
                };
                if !claimed {
                    continue;
                }
            }

            let invocation = EventInvocation {
                container: &self.container,
                extension: &subscription.extension,
                payload: &payload,
            };
            match subscription.event.handler().run(invocation).await {
                Ok(()) => report.delivered.push(id),
                Err(e) => {
                    warn!(event = %id, error = %e, "Event handler failed");
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Matching subscriptions in registration order, each with the scope it is loaded in.
    /// A subscription loaded both globally and in the guild fires once, for the guild.
    fn targets(&self, payload: &EventPayload) -> Result<Vec<(RegisteredEvent, Scope)>, RuntimeError> {
        let stores = self.container.stores()?;
        let guild = payload.guild_id.as_deref().map(Scope::guild);

        Ok(stores
            .events
            .filter(|e| e.event.name == payload.name)
            .filter_map(|e| {
                let id = e.id();
                let scope = match &guild {
                    Some(guild) if stores.event_scopes.is_loaded(&id, guild) => guild.clone(),
                    _ if stores.event_scopes.is_loaded(&id, &Scope::Global) => Scope::Global,
                    _ => return None,
                };
                Some((e.clone(), scope))
            })
            .collect())
    }
}
