// components/script.rs
//
// Behavior scripts attached to nodes, and the name-keyed registry that
// constructs them. Loading script sources is the host's job; the registry
// only maps a type name to a constructor.

use std::collections::HashMap;
use std::fmt;
use crate::components::node::Node;
use crate::core::error::NodeError;

/// A behavior attached to a node. Every hook is optional.
pub trait Script: fmt::Debug {
    /// Identifier used for registry lookup and in log messages.
    fn type_name(&self) -> &str;

    fn on_attach(&mut self, _node: &mut Node) -> Result<(), NodeError> {
        Ok(())
    }

    fn on_enable(&mut self, _node: &mut Node) -> Result<(), NodeError> {
        Ok(())
    }

    fn on_disable(&mut self, _node: &mut Node) -> Result<(), NodeError> {
        Ok(())
    }

    /// Called once per frame while the node is included in traversal.
    fn update(&mut self, _node: &mut Node, _dt: f32) -> Result<(), NodeError> {
        Ok(())
    }
}

pub type ScriptFactory = fn() -> Box<dyn Script>;

/// Plugin interface: type name -> constructor.
#[derive(Default)]
pub struct ScriptRegistry {
    factories: HashMap<String, ScriptFactory>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor. Re-registering a name replaces the old one.
    pub fn register(&mut self, name: impl Into<String>, factory: ScriptFactory) {
        let name = name.into();
        if self.factories.insert(name.clone(), factory).is_some() {
            log::debug!("script '{}' re-registered", name);
        }
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Script>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ScriptRegistry").field("scripts", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Spinner;

    impl Script for Spinner {
        fn type_name(&self) -> &str {
            "spinner"
        }
    }

    fn spinner() -> Box<dyn Script> {
        Box::new(Spinner)
    }

    #[test]
    fn create_by_name() {
        let mut registry = ScriptRegistry::new();
        registry.register("spinner", spinner);
        assert!(registry.contains("spinner"));
        assert_eq!(registry.create("spinner").unwrap().type_name(), "spinner");
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn re_register_replaces() {
        let mut registry = ScriptRegistry::new();
        registry.register("spinner", spinner);
        registry.register("spinner", spinner);
        assert_eq!(registry.len(), 1);
    }
}
