//! Tests for transformer module

use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;

// ========== Integer / decimal ==========

#[test]
fn test_integer_reverse_transform() {
    let t = IntegerTransformer;
    assert_eq!(t.reverse_transform("42"), Ok(Value::Integer(42)));
    assert_eq!(t.reverse_transform(" -7 "), Ok(Value::Integer(-7)));
    assert!(t.reverse_transform("4.2").is_err());
}

#[test]
fn test_integer_error_template() {
    // Arrange & Act
    let failed = IntegerTransformer
        .reverse_transform("abc")
        .expect_err("not an integer");

    // Assert
    assert_eq!(failed.template, "This value is not a valid integer.");
    assert_eq!(failed.parameters.get("value").map(String::as_str), Some("abc"));
}

fn decimal(units: i64, scale: u32) -> Value {
    Value::Decimal(Decimal::new(units, scale))
}

#[test]
fn test_decimal_reverse_transform() {
    let t = DecimalTransformer::new(2);
    assert_eq!(t.reverse_transform("12.5"), Ok(decimal(1250, 2)));
    assert_eq!(t.reverse_transform("-0.01"), Ok(decimal(-1, 2)));
    assert_eq!(t.reverse_transform("0.5"), Ok(decimal(50, 2)));
    assert_eq!(t.reverse_transform("+3"), Ok(decimal(300, 2)));
    assert!(t.reverse_transform("1.2.3").is_err());
    assert!(t.reverse_transform("-").is_err());
    assert!(t.reverse_transform("1e3").is_err());
    assert!(t.reverse_transform("1_000").is_err());
}

#[test]
fn test_decimal_normalizes_to_field_scale() {
    // Arrange
    let t = DecimalTransformer::new(2);

    // Act
    let padded = t.reverse_transform("3").expect("valid number");
    let trimmed = t.reverse_transform("1.500").expect("trailing zeros only");

    // Assert
    assert_eq!(padded.to_string(), "3.00");
    assert_eq!(trimmed.to_string(), "1.50");
}

#[test]
fn test_decimal_scale_beyond_decimal_range_fails_cleanly() {
    // Arrange
    let t = DecimalTransformer::new(40);

    // Act
    let failed = t.reverse_transform("1.5").expect_err("scale cannot be represented");

    // Assert
    assert_eq!(failed.template, "This value is not a valid number.");
}

#[test]
fn test_decimal_too_many_digits() {
    // Arrange & Act
    let failed = DecimalTransformer::new(2)
        .reverse_transform("1.005")
        .expect_err("scale exceeded");

    // Assert
    assert_eq!(failed.parameters.get("scale").map(String::as_str), Some("2"));
}

#[test]
fn test_decimal_transform_pads_fraction() {
    // Arrange & Act
    let view = DecimalTransformer::new(2).transform(&decimal(-5, 2));

    // Assert
    assert_eq!(view, "-0.05");
}

// ========== Money ==========

#[test]
fn test_money_with_currency() {
    let t = MoneyTransformer::new(None);
    assert_eq!(
        t.reverse_transform("eur 12.50"),
        Ok(Value::Money(Money::new("EUR", 1250)))
    );
    assert!(t.reverse_transform("12.50").is_err());
    assert!(t.reverse_transform("EURO 1").is_err());
}

#[test]
fn test_money_default_currency() {
    // Arrange
    let t = MoneyTransformer::new(Some("usd".to_string()));

    // Act
    let value = t.reverse_transform("3").expect("valid amount");

    // Assert
    assert_eq!(value, Value::Money(Money::new("USD", 300)));
    assert_eq!(t.transform(&value), "USD 3.00");
}

// ========== Date / datetime ==========

#[test]
fn test_date_roundtrip() {
    // Arrange
    let t = DateTransformer;

    // Act
    let value = t.reverse_transform("2024-02-29").expect("valid date");

    // Assert
    assert_eq!(
        value,
        Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date"))
    );
    assert_eq!(t.transform(&value), "2024-02-29");
    assert!(t.reverse_transform("2023-02-29").is_err());
}

#[test]
fn test_datetime_normalizes_to_utc() {
    // Arrange
    let t = DateTimeTransformer;
    let expected = Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());

    // Act & Assert
    assert_eq!(t.reverse_transform("2024-01-01T10:00:00+02:00"), Ok(expected.clone()));
    assert_eq!(t.reverse_transform("2024-01-01 08:00:00"), Ok(expected.clone()));
    assert_eq!(t.transform(&expected), "2024-01-01T08:00:00Z");
    assert!(t.reverse_transform("yesterday").is_err());
}

#[test]
fn test_datetime_view_keeps_fractional_seconds() {
    // Arrange
    let t = DateTimeTransformer;
    let value = t
        .reverse_transform("2024-01-01T10:00:00.25+01:00")
        .expect("valid datetime");

    // Act
    let view = t.transform(&value);

    // Assert
    assert_eq!(view, "2024-01-01T09:00:00.250Z");
    assert_eq!(t.reverse_transform(&view), Ok(value));
}

// ========== Text / boolean / choice ==========

#[test]
fn test_text_is_verbatim() {
    assert_eq!(TextTransformer.reverse_transform(" a b "), Ok(Value::text(" a b ")));
}

#[test]
fn test_boolean_spellings() {
    let t = BooleanTransformer;
    for view in ["true", "YES", "1"] {
        assert_eq!(t.reverse_transform(view), Ok(Value::Bool(true)), "{view}");
    }
    for view in ["false", "No", "0"] {
        assert_eq!(t.reverse_transform(view), Ok(Value::Bool(false)), "{view}");
    }
    assert!(t.reverse_transform("maybe").is_err());
}

#[test]
fn test_choice_maps_labels() {
    // Arrange
    let mut choices = IndexMap::new();
    choices.insert("active".to_string(), "1".to_string());
    choices.insert("blocked".to_string(), "2".to_string());
    let t = ChoiceTransformer::new(choices);

    // Act
    let value = t.reverse_transform("blocked").expect("known label");

    // Assert
    assert_eq!(value, Value::text("2"));
    assert_eq!(t.transform(&value), "blocked");
    assert!(t.reverse_transform("deleted").is_err());
}
