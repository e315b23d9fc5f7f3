//! Value comparison strategies.
//!
//! A comparator knows the ordering of one field type's normalized values and,
//! for discrete types, the next value after a given one. Range validation and
//! the optimizer are written purely against this trait.

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::Days;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{Money, Value};

/// Error raised when two values cannot be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    /// A value is not of the type the comparator handles.
    #[error("[FQ-030] cannot compare {actual} value as {expected}")]
    TypeMismatch {
        /// Type the comparator expects.
        expected: &'static str,
        /// Type that was received.
        actual: &'static str,
    },

    /// Both values have the right type but no defined order (e.g. currencies).
    #[error("[FQ-031] values are not comparable: {0}")]
    Incomparable(String),
}

/// Comparison semantics of one field type.
pub trait ValueComparator: Send + Sync + Debug {
    /// Orders `a` relative to `b`.
    ///
    /// # Errors
    ///
    /// Returns a [`ComparisonError`] when either value is of the wrong type
    /// or the two are not comparable.
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError>;

    /// Returns the value directly following `value`, or `None` when the type
    /// is not discrete (or the value is the maximum).
    fn increment(&self, value: &Value) -> Option<Value> {
        let _ = value;
        None
    }

    /// `a == b` under this comparator.
    fn is_equal(&self, a: &Value, b: &Value) -> Result<bool, ComparisonError> {
        Ok(self.compare(a, b)? == Ordering::Equal)
    }

    /// `a > b` under this comparator.
    fn is_higher(&self, a: &Value, b: &Value) -> Result<bool, ComparisonError> {
        Ok(self.compare(a, b)? == Ordering::Greater)
    }

    /// `a < b` under this comparator.
    fn is_lower(&self, a: &Value, b: &Value) -> Result<bool, ComparisonError> {
        Ok(self.compare(a, b)? == Ordering::Less)
    }
}

fn mismatch(expected: &'static str, actual: &Value) -> ComparisonError {
    ComparisonError::TypeMismatch {
        expected,
        actual: actual.type_name(),
    }
}

/// Integers, ordered numerically and incremented by one.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerComparator;

impl ValueComparator for IntegerComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError> {
        match (a, b) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Integer(_), other) | (other, _) => Err(mismatch("integer", other)),
        }
    }

    fn increment(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Integer(n) => n.checked_add(1).map(Value::Integer),
            _ => None,
        }
    }
}

/// Steps one unit of the last fraction digit `d` carries.
fn next_decimal(d: &Decimal) -> Option<Decimal> {
    Decimal::try_new(1, d.scale())
        .ok()
        .and_then(|step| d.checked_add(step))
}

/// Decimals; the increment is one unit of the value's scale.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalComparator;

impl ValueComparator for DecimalComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError> {
        match (a, b) {
            (Value::Decimal(a), Value::Decimal(b)) => Ok(a.cmp(b)),
            (Value::Decimal(_), other) | (other, _) => Err(mismatch("decimal", other)),
        }
    }

    fn increment(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Decimal(d) => next_decimal(d).map(Value::Decimal),
            _ => None,
        }
    }
}

/// Money; only amounts in the same currency are ordered.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoneyComparator;

impl ValueComparator for MoneyComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError> {
        match (a, b) {
            (Value::Money(a), Value::Money(b)) => {
                if a.currency != b.currency {
                    return Err(ComparisonError::Incomparable(format!(
                        "{} and {} are different currencies",
                        a.currency, b.currency
                    )));
                }
                Ok(a.amount.cmp(&b.amount))
            }
            (Value::Money(_), other) | (other, _) => Err(mismatch("money", other)),
        }
    }

    fn increment(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Money(m) => next_decimal(&m.amount).map(|amount| {
                Value::Money(Money {
                    currency: m.currency.clone(),
                    amount,
                })
            }),
            _ => None,
        }
    }
}

/// Calendar dates, incremented by one day.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateComparator;

impl ValueComparator for DateComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError> {
        match (a, b) {
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (Value::Date(_), other) | (other, _) => Err(mismatch("date", other)),
        }
    }

    fn increment(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Date(d) => d.checked_add_days(Days::new(1)).map(Value::Date),
            _ => None,
        }
    }
}

/// Points in time. Values are UTC already, so ordering is timezone
/// independent.
///
/// Timestamps carry sub-second precision, so the type has no increment and
/// only overlapping or touching ranges merge.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeComparator;

impl ValueComparator for DateTimeComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError> {
        match (a, b) {
            (Value::DateTime(a), Value::DateTime(b)) => Ok(a.cmp(b)),
            (Value::DateTime(_), other) | (other, _) => Err(mismatch("datetime", other)),
        }
    }
}

/// Text, choices and booleans: ordered but not discrete.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextComparator;

impl ValueComparator for TextComparator {
    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, ComparisonError> {
        match (a, b) {
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Text(_) | Value::Bool(_), other) | (other, _) => {
                Err(mismatch("text", other))
            }
        }
    }
}
