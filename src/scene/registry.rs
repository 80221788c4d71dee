use std::collections::HashMap;

use serde_json::Value;

use crate::physics::PhysicsUnit;
use crate::scene::BehaviorUnit;
use crate::Result;

/// A factory producing a unit from its serialized data blob
///
/// Passing `Value::Null` produces a default-configured instance.
pub type UnitFactory = fn(&Value) -> Result<Box<dyn BehaviorUnit>>;

/// Resolves unit type names to constructors
///
/// The registry is the only place where unit types are resolved by string
/// name; everywhere else units are queried through typed downcasts.
pub struct UnitRegistry {
    factories: HashMap<String, UnitFactory>,
}

impl UnitRegistry {
    /// Creates an empty registry
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in unit types registered
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(PhysicsUnit::TYPE_NAME, PhysicsUnit::from_data);
        registry
    }

    /// Registers a factory for the given type name
    pub fn register(&mut self, type_name: impl Into<String>, factory: UnitFactory) {
        self.factories.insert(type_name.into(), factory);
    }

    /// Resolves a type name to its factory, if registered
    pub fn resolve(&self, type_name: &str) -> Option<UnitFactory> {
        self.factories.get(type_name).copied()
    }

    /// Returns whether the given type name is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Returns the registered type names
    pub fn type_names(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}
