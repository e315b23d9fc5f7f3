//! View <-> normalized value transformers.
//!
//! `reverse_transform` sanitizes user input into a [`Value`]; `transform`
//! renders a value back into the view format that `reverse_transform`
//! accepts, which is what makes exported queries re-parseable.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::{Money, Value};

/// Failure to turn a view into a normalized value.
///
/// Carries a message template and its parameters so the rendering layer can
/// localize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationFailed {
    /// Message template with `{{ name }}` placeholders.
    pub template: String,
    /// Template parameters.
    pub parameters: BTreeMap<String, String>,
}

impl TransformationFailed {
    /// Creates a failure with the given template and no parameters.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a template parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

/// Converts between the textual view of a value and its normalized form.
pub trait ValueTransformer: Send + Sync + Debug {
    /// Parses a view into a normalized value.
    ///
    /// # Errors
    ///
    /// Returns [`TransformationFailed`] when the input is not a valid view.
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed>;

    /// Renders a normalized value as a view.
    fn transform(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Signed integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerTransformer;

impl ValueTransformer for IntegerTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        view.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| {
                TransformationFailed::new("This value is not a valid integer.")
                    .with_param("value", view)
            })
    }
}

/// Parses a plain decimal number and brings it to exactly `scale` fraction
/// digits. Trailing zeros beyond `scale` are accepted, other digits are not.
fn parse_decimal(view: &str, scale: u32) -> Result<Decimal, TransformationFailed> {
    let invalid = || {
        TransformationFailed::new("This value is not a valid number.").with_param("value", view)
    };

    let trimmed = view.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-') {
        return Err(invalid());
    }
    let parsed = Decimal::from_str_exact(digits).map_err(|_| invalid())?;

    if parsed.normalize().scale() > scale {
        return Err(
            TransformationFailed::new("This value should have {{ scale }} decimals at most.")
                .with_param("scale", scale.to_string())
                .with_param("value", view),
        );
    }

    let mut value = parsed;
    value.rescale(scale);
    if value.scale() != scale {
        return Err(invalid());
    }
    Ok(value)
}

/// Decimals with a fixed number of fraction digits.
#[derive(Debug, Clone, Copy)]
pub struct DecimalTransformer {
    scale: u32,
}

impl DecimalTransformer {
    /// Creates a transformer accepting up to `scale` fraction digits.
    #[must_use]
    pub const fn new(scale: u32) -> Self {
        Self { scale }
    }
}

impl ValueTransformer for DecimalTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        parse_decimal(view, self.scale).map(Value::Decimal)
    }
}

/// Money as `CUR amount`, or a bare amount in the default currency.
#[derive(Debug, Clone)]
pub struct MoneyTransformer {
    default_currency: Option<String>,
}

impl MoneyTransformer {
    /// Creates a transformer; without a default currency every view must
    /// name one.
    #[must_use]
    pub fn new(default_currency: Option<String>) -> Self {
        Self {
            default_currency: default_currency.map(|c| c.to_ascii_uppercase()),
        }
    }
}

impl ValueTransformer for MoneyTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        let trimmed = view.trim();
        let (currency, amount) = match trimmed.split_once(' ') {
            Some((cur, amount)) => (cur.to_ascii_uppercase(), amount.trim()),
            None => match &self.default_currency {
                Some(cur) => (cur.clone(), trimmed),
                None => {
                    return Err(TransformationFailed::new(
                        "This value is not a valid money amount, a currency is required.",
                    )
                    .with_param("value", view))
                }
            },
        };

        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(
                TransformationFailed::new("This value is not a valid currency.")
                    .with_param("value", view),
            );
        }

        let amount = parse_decimal(amount, Money::SCALE)?;
        Ok(Value::Money(Money { currency, amount }))
    }

    fn transform(&self, value: &Value) -> String {
        match value {
            Value::Money(m) => format!("{} {}", m.currency, m.amount),
            other => other.to_string(),
        }
    }
}

/// Dates in `YYYY-MM-DD` form.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTransformer;

impl ValueTransformer for DateTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        NaiveDate::parse_from_str(view.trim(), "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| {
                TransformationFailed::new("This value is not a valid date.")
                    .with_param("value", view)
            })
    }
}

/// RFC 3339 timestamps, or `YYYY-MM-DD HH:MM:SS` taken as UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeTransformer;

impl ValueTransformer for DateTimeTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        let trimmed = view.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Value::DateTime(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
            .map(|naive| Value::DateTime(naive.and_utc()))
            .map_err(|_| {
                TransformationFailed::new("This value is not a valid datetime.")
                    .with_param("value", view)
            })
    }
}

/// Free text, taken verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextTransformer;

impl ValueTransformer for TextTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        Ok(Value::Text(view.to_string()))
    }
}

/// Booleans: `true|false|yes|no|1|0`, case-insensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanTransformer;

impl ValueTransformer for BooleanTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        match view.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(TransformationFailed::new("This value is not a valid boolean.")
                .with_param("value", view)),
        }
    }
}

/// Maps user-facing labels to stored keys.
#[derive(Debug, Clone, Default)]
pub struct ChoiceTransformer {
    choices: IndexMap<String, String>,
}

impl ChoiceTransformer {
    /// Creates a transformer from `label -> stored value` pairs.
    #[must_use]
    pub fn new(choices: IndexMap<String, String>) -> Self {
        Self { choices }
    }
}

impl ValueTransformer for ChoiceTransformer {
    fn reverse_transform(&self, view: &str) -> Result<Value, TransformationFailed> {
        self.choices
            .get(view.trim())
            .map(|stored| Value::Text(stored.clone()))
            .ok_or_else(|| {
                TransformationFailed::new("The value you selected is not a valid choice.")
                    .with_param("value", view)
            })
    }

    fn transform(&self, value: &Value) -> String {
        let stored = value.to_string();
        self.choices
            .iter()
            .find(|(_, v)| **v == stored)
            .map_or(stored.clone(), |(label, _)| label.clone())
    }
}
