//! Searchable fields and field sets.
//!
//! A [`FieldSet`] is built once at configuration time and shared read-only
//! (behind an `Arc`) by every condition processed against it.

mod registry;
#[cfg(test)]
mod tests;
mod types;

pub use registry::TypeRegistry;
pub use types::{FieldType, TypeKind};

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sql::SqlConversion;

/// Value kinds a field accepts besides simple values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Accepts `lower..upper` ranges.
    pub accept_ranges: bool,
    /// Accepts `<`, `<=`, `>`, `>=`, `<>` comparisons.
    pub accept_compares: bool,
    /// Accepts `~` pattern matchers.
    pub accept_pattern_match: bool,
    /// Must appear in the root group.
    pub required: bool,
}

impl FieldOptions {
    /// Options of ordered types: ranges and comparisons.
    #[must_use]
    pub const fn ordered() -> Self {
        Self {
            accept_ranges: true,
            accept_compares: true,
            accept_pattern_match: false,
            required: false,
        }
    }

    /// Options of text types: pattern matching.
    #[must_use]
    pub const fn textual() -> Self {
        Self {
            accept_ranges: false,
            accept_compares: false,
            accept_pattern_match: true,
            required: false,
        }
    }
}

/// Immutable definition of one searchable field.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    name: String,
    field_type: Arc<FieldType>,
    options: FieldOptions,
    conversion: Option<Arc<dyn SqlConversion>>,
    model_reference: Option<String>,
}

impl FieldConfig {
    /// Creates a field with the type's default options.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: Arc<FieldType>) -> Self {
        let options = field_type.default_options();
        Self {
            name: name.into(),
            field_type,
            options,
            conversion: None,
            model_reference: None,
        }
    }

    /// Overrides the accepted value kinds.
    #[must_use]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.options.required = true;
        self
    }

    /// Attaches a backend conversion strategy.
    #[must_use]
    pub fn with_conversion(mut self, conversion: Arc<dyn SqlConversion>) -> Self {
        self.conversion = Some(conversion);
        self
    }

    /// Records the model property (`Class.property`) backing this field.
    #[must_use]
    pub fn with_model_reference(mut self, reference: impl Into<String>) -> Self {
        self.model_reference = Some(reference.into());
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Accepted value kinds.
    #[must_use]
    pub fn options(&self) -> FieldOptions {
        self.options
    }

    /// Backend conversion, if any.
    #[must_use]
    pub fn conversion(&self) -> Option<&Arc<dyn SqlConversion>> {
        self.conversion.as_ref()
    }

    /// Backing model property, if any.
    #[must_use]
    pub fn model_reference(&self) -> Option<&str> {
        self.model_reference.as_deref()
    }
}

/// Named, ordered set of fields.
#[derive(Debug, Clone)]
pub struct FieldSet {
    name: String,
    fields: IndexMap<String, Arc<FieldConfig>>,
}

impl FieldSet {
    /// Starts building a field set.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FieldSetBuilder {
        FieldSetBuilder::new(name)
    }

    /// Set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] if the field does not exist.
    pub fn get(&self, name: &str) -> Result<&FieldConfig, ConfigError> {
        self.fields
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| ConfigError::UnknownField {
                field: name.to_string(),
                field_set: self.name.clone(),
            })
    }

    /// Looks up a field, returning `None` when absent.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name).map(AsRef::as_ref)
    }

    /// Returns `true` if the set contains `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.values().map(AsRef::as_ref)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the set has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`FieldSet`].
#[derive(Debug)]
pub struct FieldSetBuilder {
    name: String,
    fields: Vec<FieldConfig>,
}

impl FieldSetBuilder {
    /// Creates a builder for a set called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a fully configured field.
    #[must_use]
    pub fn add(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a field of `field_type` with default options.
    #[must_use]
    pub fn add_field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.add(FieldConfig::new(name, Arc::new(field_type)))
    }

    /// Adds a field whose type is resolved from `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownType`] if `type_name` is not registered.
    pub fn add_registered(
        self,
        registry: &TypeRegistry,
        name: impl Into<String>,
        type_name: &str,
    ) -> Result<Self, ConfigError> {
        let field_type = registry.get(type_name)?;
        Ok(self.add(FieldConfig::new(name, field_type)))
    }

    /// Builds the set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateField`] when two fields share a name,
    /// or [`ConfigError::InvalidValue`] for an empty field name.
    pub fn build(self) -> Result<FieldSet, ConfigError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for field in self.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("{}.fields", self.name),
                    message: "field name must not be empty".to_string(),
                });
            }
            let name = field.name.clone();
            if fields.insert(name.clone(), Arc::new(field)).is_some() {
                return Err(ConfigError::DuplicateField {
                    field: name,
                    field_set: self.name,
                });
            }
        }

        Ok(FieldSet {
            name: self.name,
            fields,
        })
    }
}
