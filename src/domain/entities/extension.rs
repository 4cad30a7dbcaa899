use std::collections::HashSet;

use super::{Command, Event, Scope, Task};
use crate::application::errors::RuntimeError;

/// Where an extension may be activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionScope {
    Global,
    /// Listed guilds only; an empty list allows every guild
    Guilds(Vec<String>),
}

impl ExtensionScope {
    pub fn allows(&self, scope: &Scope) -> bool {
        match (self, scope) {
            (ExtensionScope::Global, Scope::Global) => true,
            (ExtensionScope::Guilds(list), Scope::Guild(id)) => list.is_empty() || list.contains(id),
            _ => false,
        }
    }
}

/// A named bundle of commands, events and tasks
#[derive(Debug)]
pub struct Extension {
    pub name: String,
    pub description: Option<String>,
    pub scope: ExtensionScope,
    pub commands: Vec<Command>,
    pub events: Vec<Event>,
    pub tasks: Vec<Task>,
}

impl Extension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            scope: ExtensionScope::Global,
            commands: Vec::new(),
            events: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_scope(mut self, scope: ExtensionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Rejects declarations that could never be registered
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.name.trim().is_empty() {
            return Err(RuntimeError::InvalidSchema {
                command: String::new(),
                reason: "extension name is empty".to_string(),
            });
        }

        let mut commands = HashSet::new();
        let mut external = HashSet::new();
        for command in &self.commands {
            command.validate()?;
            if !commands.insert(command.name.as_str()) {
                return Err(RuntimeError::DuplicateRegistration(format!(
                    "command {}:{}",
                    self.name, command.name
                )));
            }
            for name in command.application_command_names() {
                if !external.insert(name) {
                    return Err(RuntimeError::DuplicateRegistration(format!(
                        "application command {} in extension {}",
                        name, self.name
                    )));
                }
            }
        }

        let mut events = HashSet::new();
        for event in &self.events {
            if !events.insert(event.name.as_str()) {
                return Err(RuntimeError::DuplicateRegistration(format!(
                    "event {}:{}",
                    self.name, event.name
                )));
            }
        }

        let mut tasks = HashSet::new();
        for task in &self.tasks {
            if !tasks.insert(task.name.as_str()) {
                return Err(RuntimeError::DuplicateRegistration(format!(
                    "task {}:{}",
                    self.name, task.name
                )));
            }
        }

        Ok(())
    }
}

/// What stays registered about an extension once its parts are distributed
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRecord {
    pub name: String,
    pub description: Option<String>,
    pub scope: ExtensionScope,
}

impl From<&Extension> for ExtensionRecord {
    fn from(extension: &Extension) -> Self {
        Self {
            name: extension.name.clone(),
            description: extension.description.clone(),
            scope: extension.scope.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Command;

    #[test]
    fn test_scope_allows() {
        let g = Scope::Guild("1".to_string());
        assert!(ExtensionScope::Global.allows(&Scope::Global));
        assert!(!ExtensionScope::Global.allows(&g));
        assert!(ExtensionScope::Guilds(vec![]).allows(&g));
        assert!(ExtensionScope::Guilds(vec!["1".into()]).allows(&g));
        assert!(!ExtensionScope::Guilds(vec!["2".into()]).allows(&g));
        assert!(!ExtensionScope::Guilds(vec![]).allows(&Scope::Global));
    }

    #[test]
    fn test_duplicate_command_in_extension_rejected() {
        let ext = Extension::new("mod")
            .with_command(Command::new("ban"))
            .with_command(Command::new("ban"));
        assert!(matches!(ext.validate(), Err(RuntimeError::DuplicateRegistration(_))));
    }
}
