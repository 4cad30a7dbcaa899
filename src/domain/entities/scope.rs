use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::application::errors::RuntimeError;

/// Activation boundary: the whole bot, or one guild
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Guild(String),
}

impl Scope {
    pub fn guild(id: impl Into<String>) -> Self {
        Scope::Guild(id.into())
    }

    pub fn guild_id(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Guild(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global scope"),
            Scope::Guild(id) => write!(f, "guild {}", id),
        }
    }
}

/// Registered and per-scope loaded membership for keyed entities
#[derive(Debug)]
pub struct ScopeState<K> {
    registered: HashSet<K>,
    global: HashSet<K>,
    guilds: HashMap<String, HashSet<K>>,
}

impl<K> Default for ScopeState<K> {
    fn default() -> Self {
        Self {
            registered: HashSet::new(),
            global: HashSet::new(),
            guilds: HashMap::new(),
        }
    }
}

impl<K> ScopeState<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: K) -> Result<(), RuntimeError> {
        if self.registered.contains(&key) {
            return Err(RuntimeError::DuplicateRegistration(format!("{} is already registered", key)));
        }
        self.registered.insert(key);
        Ok(())
    }

    /// Forgets the key and drops it from every scope
    pub fn unregister(&mut self, key: &K) -> bool {
        self.global.remove(key);
        self.guilds.retain(|_, loaded| {
            loaded.remove(key);
            !loaded.is_empty()
        });
        self.registered.remove(key)
    }

    pub fn load(&mut self, key: &K, scope: &Scope) -> Result<(), RuntimeError> {
        if !self.registered.contains(key) {
            return Err(RuntimeError::NotRegistered(key.to_string()));
        }
        let loaded = match scope {
            Scope::Global => &mut self.global,
            Scope::Guild(id) => self.guilds.entry(id.clone()).or_default(),
        };
        if !loaded.insert(key.clone()) {
            return Err(RuntimeError::DuplicateRegistration(format!(
                "{} is already loaded in {}",
                key, scope
            )));
        }
        Ok(())
    }

    pub fn unload(&mut self, key: &K, scope: &Scope) -> Result<(), RuntimeError> {
        if !self.registered.contains(key) {
            return Err(RuntimeError::NotRegistered(key.to_string()));
        }
        let removed = match scope {
            Scope::Global => self.global.remove(key),
            Scope::Guild(id) => match self.guilds.get_mut(id) {
                Some(loaded) => {
                    let removed = loaded.remove(key);
                    if loaded.is_empty() {
                        self.guilds.remove(id);
                    }
                    removed
                }
                None => false,
            },
        };
        if !removed {
            return Err(RuntimeError::NotLoaded(format!("{} is not loaded in {}", key, scope)));
        }
        Ok(())
    }

    pub fn is_registered(&self, key: &K) -> bool {
        self.registered.contains(key)
    }

    pub fn is_loaded(&self, key: &K, scope: &Scope) -> bool {
        match scope {
            Scope::Global => self.global.contains(key),
            Scope::Guild(id) => self.guilds.get(id).is_some_and(|loaded| loaded.contains(key)),
        }
    }

    pub fn loaded_in(&self, scope: &Scope) -> Vec<K> {
        match scope {
            Scope::Global => self.global.iter().cloned().collect(),
            Scope::Guild(id) => self
                .guilds
                .get(id)
                .map(|loaded| loaded.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Every scope the key is currently loaded in
    pub fn scopes_of(&self, key: &K) -> Vec<Scope> {
        let mut scopes = Vec::new();
        if self.global.contains(key) {
            scopes.push(Scope::Global);
        }
        let mut guilds: Vec<&String> = self
            .guilds
            .iter()
            .filter(|(_, loaded)| loaded.contains(key))
            .map(|(id, _)| id)
            .collect();
        guilds.sort();
        scopes.extend(guilds.into_iter().map(|id| Scope::Guild(id.clone())));
        scopes
    }
}
