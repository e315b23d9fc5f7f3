//! Typed field values.
//!
//! Every value a user types into a query is kept twice: the view (the text
//! as written) and the normalized [`Value`] produced by the field type's
//! transformer. Comparison, optimization and SQL binding only ever look at
//! the normalized form.

mod comparator;
mod transformer;
#[cfg(test)]
mod transformer_tests;

pub use comparator::{
    ComparisonError, DateComparator, DateTimeComparator, DecimalComparator, IntegerComparator,
    MoneyComparator, TextComparator, ValueComparator,
};
pub use transformer::{
    BooleanTransformer, ChoiceTransformer, DateTimeTransformer, DateTransformer,
    DecimalTransformer, IntegerTransformer, MoneyTransformer, TextTransformer,
    TransformationFailed, ValueTransformer,
};

pub use rust_decimal::Decimal;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Signed integer.
    Integer(i64),
    /// Decimal number, carrying the scale of its field type.
    Decimal(Decimal),
    /// Monetary amount.
    Money(Money),
    /// Calendar date.
    Date(NaiveDate),
    /// Point in time, always normalized to UTC.
    DateTime(DateTime<Utc>),
    /// Free text or the stored key of a choice.
    Text(String),
    /// Boolean flag.
    Bool(bool),
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Money(_) => "money",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
        }
    }

    /// Returns the text content, if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Creates a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Money(m) => write!(f, "{m}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// Amount of money with two fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// ISO 4217 currency code, upper case.
    pub currency: String,
    /// Amount, always at [`Money::SCALE`].
    pub amount: Decimal,
}

impl Money {
    /// Number of minor-unit digits.
    pub const SCALE: u32 = 2;

    /// Creates a money value from an amount in minor units (cents).
    #[must_use]
    pub fn new(currency: impl Into<String>, minor_units: i64) -> Self {
        Self {
            currency: currency.into(),
            amount: Decimal::new(minor_units, Self::SCALE),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}
