//! Uniqueness-checked, insertion-ordered store

use std::fmt;

use crate::application::errors::RuntimeError;
use crate::domain::entities::{
    ApplicationCommandEntry, CommandId, EventId, ExtensionRecord, RegisteredCommand, RegisteredEvent,
    RegisteredTask,
};

/// Entries carry the identity the registry deduplicates on
pub trait RegistryEntry {
    type Key: PartialEq + fmt::Display;

    fn key(&self) -> Self::Key;
}

/// Registry preserving insertion order
#[derive(Debug)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` unless `is_duplicate` matches an existing entry
    pub fn add_by<F>(&mut self, item: T, label: impl fmt::Display, is_duplicate: F) -> Result<(), RuntimeError>
    where
        F: Fn(&T, &T) -> bool,
    {
        if self.items.iter().any(|existing| is_duplicate(existing, &item)) {
            return Err(RuntimeError::DuplicateRegistration(format!("{} is already registered", label)));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn find<P>(&self, predicate: P) -> Option<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.items.iter().find(|item| predicate(item))
    }

    /// Removes the first match
    pub fn remove<P>(&mut self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        match self.items.iter().position(|item| predicate(item)) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every match and hands them back in insertion order
    pub fn remove_all<P>(&mut self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if predicate(&item) {
                removed.push(item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        removed
    }

    pub fn filter<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a T> + 'a
    where
        P: Fn(&T) -> bool + 'a,
    {
        self.items.iter().filter(move |item| predicate(item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: RegistryEntry> Registry<T> {
    /// Adds `item`, failing if an entry with the same key exists
    pub fn add(&mut self, item: T) -> Result<(), RuntimeError> {
        let key = item.key();
        if self.items.iter().any(|existing| existing.key() == key) {
            return Err(RuntimeError::DuplicateRegistration(format!("{} is already registered", key)));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.get(key).is_some()
    }
}

impl RegistryEntry for ExtensionRecord {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

impl RegistryEntry for RegisteredCommand {
    type Key = CommandId;

    fn key(&self) -> CommandId {
        self.id()
    }
}

impl RegistryEntry for RegisteredEvent {
    type Key = EventId;

    fn key(&self) -> EventId {
        self.id()
    }
}

impl RegistryEntry for RegisteredTask {
    type Key = String;

    fn key(&self) -> String {
        format!("{}:{}", self.extension, self.task.name)
    }
}

impl RegistryEntry for ApplicationCommandEntry {
    type Key = String;

    fn key(&self) -> String {
        format!("{}:{}", self.extension, self.descriptor.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        owner: &'static str,
        name: &'static str,
    }

    impl RegistryEntry for Item {
        type Key = String;

        fn key(&self) -> String {
            format!("{}:{}", self.owner, self.name)
        }
    }

    fn item(owner: &'static str, name: &'static str) -> Item {
        Item { owner, name }
    }

    #[test]
    fn test_duplicate_add_leaves_registry_unchanged() {
        let mut registry = Registry::new();
        registry.add(item("a", "x")).unwrap();
        registry.add(item("b", "x")).unwrap();

        let err = registry.add(item("a", "x")).unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateRegistration(_)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![&item("a", "x"), &item("b", "x")]);
    }

    #[test]
    fn test_add_by_predicate() {
        let mut registry = Registry::new();
        registry.add_by(item("a", "x"), "x", |l, r| l.name == r.name).unwrap();
        assert!(registry.add_by(item("b", "x"), "x", |l, r| l.name == r.name).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_returns_first_in_insertion_order() {
        let mut registry = Registry::new();
        registry.add(item("a", "x")).unwrap();
        registry.add(item("b", "x")).unwrap();
        assert_eq!(registry.find(|i| i.name == "x"), Some(&item("a", "x")));
        assert!(registry.find(|i| i.name == "y").is_none());
    }

    #[test]
    fn test_remove_and_remove_all() {
        let mut registry = Registry::new();
        registry.add(item("a", "x")).unwrap();
        registry.add(item("a", "y")).unwrap();
        registry.add(item("b", "z")).unwrap();

        assert!(registry.remove(|i| i.name == "z"));
        assert!(!registry.remove(|i| i.name == "z"));

        let removed = registry.remove_all(|i| i.owner == "a");
        assert_eq!(removed, vec![item("a", "x"), item("a", "y")]);
        assert!(registry.is_empty());
    }
}
