//! `fieldquery` configuration.
//!
//! A configuration file describes the field set, the processor limits and
//! the SQL target, so a whole search setup can be declared in
//! `fieldquery.toml`:
//!
//! ```toml
//! [processor]
//! max_nesting_level = 3
//!
//! [sql]
//! platform = "mysql"
//!
//! [fieldset]
//! name = "customers"
//!
//! [[fieldset.fields]]
//! name = "id"
//! type = "integer"
//! column = "c.id"
//!
//! [[fieldset.fields]]
//! name = "age"
//! type = "integer"
//! column = "c.birthday"
//! conversion = { kind = "age" }
//! ```
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`FIELDQUERY_*`, sections split on `__`,
//!    e.g. `FIELDQUERY_SQL__PLATFORM=sqlite`)
//! 2. Configuration file (`fieldquery.toml`)
//! 3. Default values

use std::path::Path;
use std::sync::Arc;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub use crate::error::ConfigError;
use crate::field::{FieldConfig, FieldOptions, FieldSet, FieldType, TypeRegistry};
use crate::input::{DEFAULT_MAX_GROUPS, DEFAULT_MAX_NESTING_LEVEL, DEFAULT_MAX_VALUES};
use crate::sql::{
    AgeConversion, CastConversion, ColumnMapping, FieldMappings, FunctionConversion, Platform,
    SqlConversion,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "fieldquery.toml";

/// Structural limits applied by input processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorLimits {
    /// Deepest allowed subgroup level (root is level 0).
    pub max_nesting_level: usize,
    /// Maximum number of values per field per group.
    pub max_values: usize,
    /// Maximum number of subgroups per group.
    pub max_groups: usize,
}

impl Default for ProcessorLimits {
    fn default() -> Self {
        Self {
            max_nesting_level: DEFAULT_MAX_NESTING_LEVEL,
            max_values: DEFAULT_MAX_VALUES,
            max_groups: DEFAULT_MAX_GROUPS,
        }
    }
}

/// SQL generation section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Target dialect.
    pub platform: Platform,
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Backend conversion of a configured field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConversionDefinition {
    /// `CAST(x AS db_type)`.
    Cast {
        /// Database type to cast to.
        db_type: String,
    },
    /// `name(column)`.
    Function {
        /// SQL function name.
        name: String,
    },
    /// Birth date column searched as an age in years.
    Age,
}

impl ConversionDefinition {
    fn build(&self) -> Arc<dyn SqlConversion> {
        match self {
            Self::Cast { db_type } => Arc::new(CastConversion::new(db_type.clone())),
            Self::Function { name } => Arc::new(FunctionConversion::new(name.clone())),
            Self::Age => Arc::new(AgeConversion),
        }
    }
}

/// One `[[fieldset.fields]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefinition {
    /// Field name used in queries.
    pub name: String,
    /// Registered type name (`integer`, `decimal`, `money`, `date`,
    /// `datetime`, `text`, `boolean`, `choice` or a custom type).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Column or expression; defaults to the field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Quote `column` as an identifier.
    pub quoted: bool,
    /// Field must be present in the root group.
    pub required: bool,
    /// Overrides the type's range support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_ranges: Option<bool>,
    /// Overrides the type's comparison support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_compares: Option<bool>,
    /// Overrides the type's pattern-match support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_pattern_match: Option<bool>,
    /// Fraction digits of a `decimal` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Default currency of a `money` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Backing model property (`Class.property`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_reference: Option<String>,
    /// Label to stored value pairs of a `choice` field.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub choices: IndexMap<String, String>,
    /// Backend conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionDefinition>,
}

impl FieldDefinition {
    /// Creates a definition with the type's default capabilities.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    /// Column the field maps to.
    #[must_use]
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    fn resolve_type(&self, registry: &TypeRegistry) -> Result<Arc<FieldType>, ConfigError> {
        match (self.field_type.as_str(), self.scale, &self.currency) {
            ("decimal", Some(scale), _) => Ok(Arc::new(FieldType::decimal(scale))),
            ("money", _, Some(currency)) => Ok(Arc::new(FieldType::money(Some(currency.clone())))),
            ("choice", _, _) => Ok(Arc::new(FieldType::choice(self.choices.clone()))),
            (name, _, _) => registry.get(name),
        }
    }

    fn build(&self, registry: &TypeRegistry) -> Result<FieldConfig, ConfigError> {
        let field_type = self.resolve_type(registry)?;
        let defaults = field_type.default_options();
        let options = FieldOptions {
            accept_ranges: self.accept_ranges.unwrap_or(defaults.accept_ranges),
            accept_compares: self.accept_compares.unwrap_or(defaults.accept_compares),
            accept_pattern_match: self
                .accept_pattern_match
                .unwrap_or(defaults.accept_pattern_match),
            required: self.required || defaults.required,
        };

        let mut field = FieldConfig::new(self.name.clone(), field_type).with_options(options);
        if let Some(conversion) = &self.conversion {
            field = field.with_conversion(conversion.build());
        }
        if let Some(reference) = &self.model_reference {
            field = field.with_model_reference(reference.clone());
        }
        Ok(field)
    }
}

/// Field set section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSetConfig {
    /// Field set name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDefinition>,
}

impl Default for FieldSetConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            fields: Vec::new(),
        }
    }
}

/// Main `fieldquery` configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FieldQueryConfig {
    /// Input processor limits.
    pub processor: ProcessorLimits,
    /// SQL generation.
    pub sql: SqlConfig,
    /// Logging.
    pub logging: LoggingConfig,
    /// Searchable fields.
    pub fieldset: FieldSetConfig,
}

impl FieldQueryConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error: defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("FIELDQUERY_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// Type names are checked by [`build_field_set`](Self::build_field_set),
    /// which has the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processor.max_values == 0 {
            return Err(ConfigError::InvalidValue {
                key: "processor.max_values".to_string(),
                message: "value must be at least 1".to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        if self.fieldset.name.trim().is_empty() {
            return Err(invalid("fieldset.name", "field set name must not be empty"));
        }

        let mut seen = FxHashSet::default();
        for (i, field) in self.fieldset.fields.iter().enumerate() {
            let key = |name: &str| format!("fieldset.fields[{i}].{name}");

            if field.name.trim().is_empty() {
                return Err(invalid(&key("name"), "field name must not be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(
                    &key("name"),
                    &format!("field '{}' is defined more than once", field.name),
                ));
            }
            if field.field_type.trim().is_empty() {
                return Err(invalid(&key("type"), "field type must not be empty"));
            }
            if field.column().trim().is_empty() {
                return Err(invalid(&key("column"), "column must not be empty"));
            }
            validate_type_options(field, &key)?;
            validate_conversion(field, &key)?;
        }

        Ok(())
    }

    /// Builds the field set, resolving types through `registry`.
    ///
    /// `decimal` with a `scale`, `money` with a `currency` and `choice`
    /// fields get a dedicated type instance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownType`] for unregistered types and
    /// [`ConfigError::DuplicateField`] for repeated names.
    pub fn build_field_set(&self, registry: &TypeRegistry) -> Result<FieldSet, ConfigError> {
        let builder = self
            .fieldset
            .fields
            .iter()
            .try_fold(FieldSet::builder(self.fieldset.name.clone()), |builder, field| {
                Ok::<_, ConfigError>(builder.add(field.build(registry)?))
            })?;
        let field_set = builder.build()?;
        tracing::debug!(
            field_set = field_set.name(),
            fields = field_set.len(),
            "built field set from configuration"
        );
        Ok(field_set)
    }

    /// Column mappings of every configured field.
    #[must_use]
    pub fn field_mappings(&self) -> FieldMappings {
        self.fieldset
            .fields
            .iter()
            .fold(FieldMappings::new(), |mappings, field| {
                let column = if field.quoted {
                    ColumnMapping::quoted(field.column())
                } else {
                    ColumnMapping::raw(field.column())
                };
                mappings.with(field.name.clone(), column)
            })
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn validate_type_options(
    field: &FieldDefinition,
    key: &dyn Fn(&str) -> String,
) -> Result<(), ConfigError> {
    let type_name = field.field_type.as_str();

    if let Some(scale) = field.scale {
        if type_name != "decimal" {
            return Err(invalid(&key("scale"), "only decimal fields have a scale"));
        }
        if scale > 18 {
            return Err(invalid(
                &key("scale"),
                &format!("value {scale} is out of range [0, 18]"),
            ));
        }
    }

    if let Some(currency) = &field.currency {
        if type_name != "money" {
            return Err(invalid(&key("currency"), "only money fields have a currency"));
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid(
                &key("currency"),
                &format!("'{currency}' is not a three-letter currency code"),
            ));
        }
    }

    match (type_name == "choice", field.choices.is_empty()) {
        (true, true) => Err(invalid(&key("choices"), "choice fields need at least one choice")),
        (false, false) => Err(invalid(&key("choices"), "only choice fields have choices")),
        _ => Ok(()),
    }
}

fn validate_conversion(
    field: &FieldDefinition,
    key: &dyn Fn(&str) -> String,
) -> Result<(), ConfigError> {
    match &field.conversion {
        Some(ConversionDefinition::Cast { db_type }) if db_type.trim().is_empty() => Err(invalid(
            &key("conversion.db_type"),
            "cast type must not be empty",
        )),
        Some(ConversionDefinition::Function { name })
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            Err(invalid(
                &key("conversion.name"),
                &format!("'{name}' is not a valid function name"),
            ))
        }
        _ => Ok(()),
    }
}
