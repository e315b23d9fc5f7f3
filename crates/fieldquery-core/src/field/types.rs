//! Field type descriptors.
//!
//! A [`FieldType`] is a tag plus the strategies that give a field its value
//! semantics. Types are composed, not subclassed: a custom type is just a new
//! combination of comparator and transformer.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{
    BooleanTransformer, ChoiceTransformer, DateComparator, DateTimeComparator, DateTimeTransformer,
    DateTransformer, DecimalComparator, DecimalTransformer, IntegerComparator, IntegerTransformer,
    MoneyComparator, MoneyTransformer, TextComparator, TextTransformer, ValueComparator,
    ValueTransformer,
};

use super::FieldOptions;

/// Kind of values a field type produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Whole numbers.
    Integer,
    /// Fixed-point numbers.
    Decimal,
    /// Monetary amounts.
    Money,
    /// Calendar dates.
    Date,
    /// Timestamps.
    DateTime,
    /// Free text.
    Text,
    /// Label mapped to a stored key.
    Choice,
    /// True/false.
    Boolean,
    /// Anything built from custom strategies.
    Custom,
}

/// Descriptor of a field type: tag, strategies and default capabilities.
#[derive(Clone)]
pub struct FieldType {
    name: String,
    kind: TypeKind,
    comparator: Arc<dyn ValueComparator>,
    transformer: Arc<dyn ValueTransformer>,
    default_options: FieldOptions,
}

impl FieldType {
    /// Creates a field type from explicit strategies.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: TypeKind,
        comparator: Arc<dyn ValueComparator>,
        transformer: Arc<dyn ValueTransformer>,
        default_options: FieldOptions,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            comparator,
            transformer,
            default_options,
        }
    }

    /// Integer type; accepts ranges and comparisons.
    #[must_use]
    pub fn integer() -> Self {
        Self::new(
            "integer",
            TypeKind::Integer,
            Arc::new(IntegerComparator),
            Arc::new(IntegerTransformer),
            FieldOptions::ordered(),
        )
    }

    /// Decimal type with `scale` fraction digits.
    #[must_use]
    pub fn decimal(scale: u32) -> Self {
        Self::new(
            "decimal",
            TypeKind::Decimal,
            Arc::new(DecimalComparator),
            Arc::new(DecimalTransformer::new(scale)),
            FieldOptions::ordered(),
        )
    }

    /// Money type; bare amounts use `default_currency` when set.
    #[must_use]
    pub fn money(default_currency: Option<String>) -> Self {
        Self::new(
            "money",
            TypeKind::Money,
            Arc::new(MoneyComparator),
            Arc::new(MoneyTransformer::new(default_currency)),
            FieldOptions::ordered(),
        )
    }

    /// Date type.
    #[must_use]
    pub fn date() -> Self {
        Self::new(
            "date",
            TypeKind::Date,
            Arc::new(DateComparator),
            Arc::new(DateTransformer),
            FieldOptions::ordered(),
        )
    }

    /// Timestamp type.
    #[must_use]
    pub fn datetime() -> Self {
        Self::new(
            "datetime",
            TypeKind::DateTime,
            Arc::new(DateTimeComparator),
            Arc::new(DateTimeTransformer),
            FieldOptions::ordered(),
        )
    }

    /// Text type; accepts pattern matching.
    #[must_use]
    pub fn text() -> Self {
        Self::new(
            "text",
            TypeKind::Text,
            Arc::new(TextComparator),
            Arc::new(TextTransformer),
            FieldOptions::textual(),
        )
    }

    /// Boolean type.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(
            "boolean",
            TypeKind::Boolean,
            Arc::new(TextComparator),
            Arc::new(BooleanTransformer),
            FieldOptions::default(),
        )
    }

    /// Choice type from `label -> stored value` pairs.
    #[must_use]
    pub fn choice(choices: IndexMap<String, String>) -> Self {
        Self::new(
            "choice",
            TypeKind::Choice,
            Arc::new(TextComparator),
            Arc::new(ChoiceTransformer::new(choices)),
            FieldOptions::default(),
        )
    }

    /// Registered type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Comparison strategy.
    #[must_use]
    pub fn comparator(&self) -> &dyn ValueComparator {
        self.comparator.as_ref()
    }

    /// View/value transformer.
    #[must_use]
    pub fn transformer(&self) -> &dyn ValueTransformer {
        self.transformer.as_ref()
    }

    /// Capabilities fields of this type get unless overridden.
    #[must_use]
    pub fn default_options(&self) -> FieldOptions {
        self.default_options
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldType")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default_options", &self.default_options)
            .finish_non_exhaustive()
    }
}
