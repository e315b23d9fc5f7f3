//! Tests for `matcher` module

use std::collections::HashMap;

use chrono::NaiveDate;

use super::matcher::like_match;
use crate::sql::{like_pattern, LIKE_ESCAPE};
use crate::test_fixtures::{customer_field_set, parse, parse_valid};
use crate::{CompareOp, PatternKind, SearchConditionBuilder, Value};

fn record(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

// -------------------------------------------------------------------------
// LIKE matching
// -------------------------------------------------------------------------

#[test]
fn test_like_wildcards() {
    assert!(like_match("Paris", "Par%", '\\', false));
    assert!(like_match("Paris", "%ari%", '\\', false));
    assert!(like_match("Paris", "P_ris", '\\', false));
    assert!(!like_match("Paris", "P_is", '\\', false));
    assert!(like_match("", "%", '\\', false));
    assert!(!like_match("", "_", '\\', false));
}

#[test]
fn test_like_escaped_wildcards_are_literal() {
    // Arrange
    let pattern = like_pattern(PatternKind::Contains, "a%b", LIKE_ESCAPE);

    // Act & Assert
    assert_eq!(pattern, "%a\\%b%");
    assert!(like_match("xa%bz", &pattern, LIKE_ESCAPE, false));
    assert!(!like_match("xabz", &pattern, LIKE_ESCAPE, false));
    assert!(!like_match("xaXbz", &pattern, LIKE_ESCAPE, false));
}

#[test]
fn test_like_case_insensitive() {
    // Arrange
    let pattern = like_pattern(PatternKind::Contains, "a%b", LIKE_ESCAPE);

    // Act & Assert
    assert!(like_match("xAa%bz", &pattern, LIKE_ESCAPE, true));
    assert!(!like_match("xAabz", &pattern, LIKE_ESCAPE, true));
    assert!(!like_match("xAA%Bz", &pattern, LIKE_ESCAPE, false));
}

#[test]
fn test_like_multibyte() {
    assert!(like_match("Zürich", "Z_rich", '\\', false));
    assert!(like_match("ÉCOLE", "%cole", '\\', true));
}

// -------------------------------------------------------------------------
// Condition matching
// -------------------------------------------------------------------------

#[test]
fn test_matches_simple_and_excluded() {
    // Arrange
    let condition = parse_valid("id: 1, 2; name: !\"john\"");

    // Act & Assert
    assert!(condition.matches(&record(&[("id", Value::Integer(1)), ("name", Value::text("jane"))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(3)), ("name", Value::text("jane"))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(2)), ("name", Value::text("john"))])));
}

#[test]
fn test_matches_missing_field_is_null() {
    // Arrange
    let condition = parse_valid("name: !\"john\"");

    // Act
    let matched = condition.matches(&record(&[("id", Value::Integer(1))]));

    // Assert
    assert!(!matched);
}

#[test]
fn test_matches_ranges_with_exclusive_bounds() {
    // Arrange
    let condition = parse_valid("id: ]1..5[");

    // Act & Assert
    assert!(!condition.matches(&record(&[("id", Value::Integer(1))])));
    assert!(condition.matches(&record(&[("id", Value::Integer(2))])));
    assert!(condition.matches(&record(&[("id", Value::Integer(4))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(5))])));
}

#[test]
fn test_matches_excluded_range() {
    // Arrange
    let condition = parse_valid("birthday: !2000-01-01..2000-12-31");

    // Act & Assert
    assert!(condition.matches(&record(&[("birthday", date(1999, 12, 31))])));
    assert!(!condition.matches(&record(&[("birthday", date(2000, 6, 1))])));
    assert!(condition.matches(&record(&[("birthday", date(2001, 1, 1))])));
}

#[test]
fn test_matches_comparisons() {
    // Arrange
    let condition = parse_valid("id: >10, <>15");

    // Act & Assert
    assert!(condition.matches(&record(&[("id", Value::Integer(11))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(10))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(15))])));
}

#[test]
fn test_matches_patterns() {
    // Arrange
    let condition = parse_valid("name: ~i>jo, ~!*x");

    // Act & Assert
    assert!(condition.matches(&record(&[("name", Value::text("John"))])));
    assert!(!condition.matches(&record(&[("name", Value::text("Jox"))])));
    assert!(!condition.matches(&record(&[("name", Value::text("Mary"))])));
}

#[test]
fn test_matches_or_root_and_subgroups() {
    // Arrange
    let condition = parse_valid("*id: 1; (name: ~>a; id: >5)");

    // Act & Assert
    assert!(condition.matches(&record(&[("id", Value::Integer(1)), ("name", Value::text("z"))])));
    assert!(condition.matches(&record(&[("id", Value::Integer(6)), ("name", Value::text("ann"))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(6)), ("name", Value::text("bob"))])));
}

#[test]
fn test_empty_condition_matches_everything() {
    // Arrange
    let condition = parse_valid("");

    // Act & Assert
    assert!(condition.matches(&record(&[])));
}

#[test]
fn test_invalid_condition_matches_nothing() {
    // Arrange
    let condition = parse("id: abc");

    // Act & Assert
    assert!(!condition.is_valid());
    assert!(!condition.matches(&record(&[("id", Value::Integer(1))])));
}

#[test]
fn test_primary_condition_is_anded() {
    // Arrange
    let condition = SearchConditionBuilder::new(customer_field_set())
        .field("id", |v| v.compare(CompareOp::Gt, "10"))
        .primary(|p| p.field("status", |v| v.simple("active")))
        .build()
        .expect("condition");

    // Act & Assert
    assert!(condition.matches(&record(&[("id", Value::Integer(11)), ("status", Value::text("1"))])));
    assert!(!condition.matches(&record(&[("id", Value::Integer(11)), ("status", Value::text("2"))])));
}
