//! Named field-type registry.
//!
//! Types are registered either as ready instances or as factories; a factory
//! runs on the first lookup and its result is cached for every later one.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::error::ConfigError;

use super::FieldType;

type TypeFactory = Arc<dyn Fn() -> FieldType + Send + Sync>;

enum Entry {
    Factory(TypeFactory),
    Resolved(Arc<FieldType>),
}

/// Registry of field types by name.
///
/// Thread-safe: every access goes through one lock, and factories run with
/// no lock held, so a factory may itself look up other types.
pub struct TypeRegistry {
    entries: RwLock<FxHashMap<String, Entry>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Creates a registry with the built-in types: `integer`, `decimal`
    /// (two digits), `money` (currency required), `date`, `datetime`, `text`
    /// and `boolean`.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let registry = Self::new();
        registry.register_factory("integer", FieldType::integer);
        registry.register_factory("decimal", || FieldType::decimal(2));
        registry.register_factory("money", || FieldType::money(None));
        registry.register_factory("date", FieldType::date);
        registry.register_factory("datetime", FieldType::datetime);
        registry.register_factory("text", FieldType::text);
        registry.register_factory("boolean", FieldType::boolean);
        registry
    }

    /// Registers a ready-made type, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, field_type: FieldType) {
        self.entries
            .write()
            .insert(name.into(), Entry::Resolved(Arc::new(field_type)));
    }

    /// Registers a lazily constructed type, replacing any previous entry.
    pub fn register_factory<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> FieldType + Send + Sync + 'static,
    {
        self.entries
            .write()
            .insert(name.into(), Entry::Factory(Arc::new(factory)));
    }

    /// Returns `true` when `name` is registered (resolved or not).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Resolves a type by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownType`] when nothing is registered under
    /// `name`.
    pub fn get(&self, name: &str) -> Result<Arc<FieldType>, ConfigError> {
        let factory = match self.entries.read().get(name) {
            Some(Entry::Resolved(found)) => return Ok(Arc::clone(found)),
            Some(Entry::Factory(factory)) => Arc::clone(factory),
            None => return Err(ConfigError::UnknownType(name.to_string())),
        };

        let built = Arc::new(factory());

        let mut entries = self.entries.write();
        match entries.get(name) {
            // Another thread resolved it first.
            Some(Entry::Resolved(found)) => Ok(Arc::clone(found)),
            Some(Entry::Factory(current)) if Arc::ptr_eq(current, &factory) => {
                entries.insert(name.to_string(), Entry::Resolved(Arc::clone(&built)));
                tracing::debug!(field_type = name, "resolved field type");
                Ok(built)
            }
            // Re-registered while the factory ran: keep the new entry.
            _ => Ok(built),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}
