//! Extension loader - yields constructed extensions to the manager

use crate::application::errors::RuntimeError;
use crate::domain::entities::Extension;

/// One extension as produced by a loader
pub struct Discovered {
    pub name: String,
    pub extension: Result<Extension, RuntimeError>,
}

/// Source of extensions (static list, discovery, ...)
pub trait ExtensionLoader: Send + Sync {
    fn load(&self) -> Vec<Discovered>;
}

type Factory = Box<dyn Fn() -> Result<Extension, RuntimeError> + Send + Sync>;

/// Loader over extension factories compiled into the binary
#[derive(Default)]
pub struct StaticLoader {
    factories: Vec<(String, Factory)>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory that cannot fail
    pub fn with<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Extension + Send + Sync + 'static,
    {
        self.with_fallible(name, move || Ok(factory()))
    }

    pub fn with_fallible<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Extension, RuntimeError> + Send + Sync + 'static,
    {
        self.factories.push((name.into(), Box::new(factory)));
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ExtensionLoader for StaticLoader {
    fn load(&self) -> Vec<Discovered> {
        self.factories
            .iter()
            .map(|(name, factory)| Discovered {
                name: name.clone(),
                extension: factory(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_loader_yields_in_order() {
        let loader = StaticLoader::new()
            .with("a", || Extension::new("a"))
            .with_fallible("b", || Err(RuntimeError::Internal("boom".into())))
            .with("c", || Extension::new("c"));

        let discovered = loader.load();
        assert_eq!(loader.len(), 3);
        let names: Vec<&str> = discovered.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(discovered[1].extension.is_err());
    }
}
