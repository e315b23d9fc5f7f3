//! Tests for the condition optimizer.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone, Utc};

use super::*;
use crate::condition::{Range, SingleValue};
use crate::input::InputProcessor;
use crate::test_fixtures::{parse, parse_valid};
use crate::value::Value;

fn optimized(input: &str) -> SearchCondition {
    ConditionOptimizer::new().optimize(parse_valid(input))
}

fn int(n: i64) -> SingleValue {
    SingleValue::from_value(Value::Integer(n))
}

fn ints(values: &[SingleValue]) -> Vec<i64> {
    values
        .iter()
        .map(|v| match v.value {
            Value::Integer(n) => n,
            ref other => panic!("not an integer: {other:?}"),
        })
        .collect()
}

// ========== Ranges ==========

#[test]
fn test_adjacent_integer_ranges_merge() {
    // Arrange & Act
    let condition = optimized("id: 6..10, 1..5");

    // Assert
    let id = condition.values_group().field("id").expect("id");
    assert_eq!(id.ranges, vec![Range::inclusive(int(1), int(10))]);
    assert_eq!(id.ranges[0].upper.view, "10");
}

#[test]
fn test_overlapping_ranges_merge() {
    // Arrange & Act
    let condition = optimized("id: 1..5, 3..8, 20..30, 25..26");

    // Assert
    let id = condition.values_group().field("id").expect("id");
    assert_eq!(
        id.ranges,
        vec![Range::inclusive(int(1), int(8)), Range::inclusive(int(20), int(30))]
    );
}

#[test]
fn test_exclusive_bounds_do_not_connect() {
    // Arrange & Act
    let condition = optimized("id: 1..5[, ]5..10");

    // Assert
    assert_eq!(condition.values_group().field("id").expect("id").ranges.len(), 2);
}

#[test]
fn test_touching_ranges_with_one_inclusive_bound_merge() {
    // Arrange & Act
    let condition = optimized("id: 1..5, ]5..10[");

    // Assert
    assert_eq!(
        condition.values_group().field("id").expect("id").ranges,
        vec![Range::new(int(1), int(10), true, false)]
    );
}

#[test]
fn test_date_ranges_merge_by_day() {
    // Arrange & Act
    let condition = optimized("birthday: 2024-01-01..2024-01-31, 2024-02-01..2024-02-29");

    // Assert
    let ranges = &condition.values_group().field("birthday").expect("birthday").ranges;
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].upper.view, "2024-02-29");
}

#[test]
fn test_datetime_ranges_with_a_gap_stay_apart() {
    // Arrange
    let condition = parse_valid(
        r#"created: "2024-01-01T10:00:00.2Z".."2024-01-01T10:00:00.5Z", "2024-01-01T10:00:01.5Z".."2024-01-01T10:00:02Z""#,
    );
    let record = HashMap::from([(
        "created".to_string(),
        Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 1).unwrap()),
    )]);

    // Act
    let optimized = ConditionOptimizer::new().optimize(condition.clone());

    // Assert
    assert_eq!(optimized.values_group().field("created").expect("created").ranges.len(), 2);
    assert!(!condition.matches(&record));
    assert!(!optimized.matches(&record));
}

#[test]
fn test_whole_second_datetime_ranges_do_not_swallow_fractions() {
    // Arrange & Act
    let condition = optimized(
        r#"created: "2024-01-01T09:00:00Z".."2024-01-01T10:00:00Z", "2024-01-01T10:00:01Z".."2024-01-01T11:00:00Z""#,
    );
    let record = HashMap::from([(
        "created".to_string(),
        Value::DateTime(
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + chrono::TimeDelta::milliseconds(500),
        ),
    )]);

    // Assert
    assert_eq!(condition.values_group().field("created").expect("created").ranges.len(), 2);
    assert!(!condition.matches(&record));
}

#[test]
fn test_text_ranges_only_merge_when_overlapping() {
    // Arrange
    let field_set = crate::field::FieldSet::builder("s")
        .add(
            crate::field::FieldConfig::new("name", std::sync::Arc::new(crate::field::FieldType::text()))
                .with_options(crate::field::FieldOptions::ordered()),
        )
        .build()
        .expect("field set");
    let config = crate::input::ProcessorConfig::new(std::sync::Arc::new(field_set));
    let condition = crate::input::StringQueryInput::new().process(&config, "name: a..b, c..d, b..c");

    // Act
    let condition = ConditionOptimizer::new().optimize(condition);

    // Assert
    let ranges = &condition.values_group().field("name").expect("name").ranges;
    assert_eq!(ranges.len(), 1);
    assert_eq!((ranges[0].lower.view.as_str(), ranges[0].upper.view.as_str()), ("a", "d"));
}

// ========== Values ==========

#[test]
fn test_values_inside_ranges_are_removed() {
    // Arrange & Act
    let condition = optimized("id: 3, 10, 7, 1..5, ]10..20; id: !15, !30, !10..20");

    // Assert
    let id = condition.values_group().field("id").expect("id");
    assert_eq!(ints(&id.simple_values), [10, 7]);
    assert_eq!(ints(&id.excluded_simple_values), [30]);
}

#[test]
fn test_bound_on_exclusive_side_is_kept() {
    // Arrange & Act
    let condition = optimized("id: 10, ]10..20");

    // Assert
    assert_eq!(ints(&condition.values_group().field("id").expect("id").simple_values), [10]);
}

#[test]
fn test_duplicates_are_removed_in_subgroups() {
    // Arrange
    let mut parts = parse_valid("(id: >5; name: ~*a)").into_parts();
    let bag = parts.root.groups_mut()[0].field_mut("id");
    bag.simple_values.extend([int(1), int(1), int(2)]);
    bag.comparisons.push(bag.comparisons[0].clone());
    let names = parts.root.groups_mut()[0].field_mut("name");
    names.pattern_matchers.push(names.pattern_matchers[0].clone());
    let condition = SearchCondition::from_parts(parts);

    // Act
    let condition = ConditionOptimizer::new().optimize(condition);

    // Assert
    let child = &condition.values_group().groups()[0];
    let id = child.field("id").expect("id");
    assert_eq!(ints(&id.simple_values), [1, 2]);
    assert_eq!(id.comparisons.len(), 1);
    assert_eq!(child.field("name").expect("name").pattern_matchers.len(), 1);
}

#[test]
fn test_primary_condition_is_optimized_separately() {
    // Arrange
    let condition = crate::condition::SearchConditionBuilder::new(crate::test_fixtures::customer_field_set())
        .field("id", |v| v.simple("3"))
        .primary(|p| p.field("id", |v| v.range("1", "5").simple("3")))
        .build()
        .expect("condition");

    // Act
    let condition = ConditionOptimizer::new().optimize(condition);

    // Assert
    assert_eq!(ints(&condition.values_group().field("id").expect("id").simple_values), [3]);
    let primary = condition.primary_condition().expect("primary");
    assert!(primary.field("id").expect("id").simple_values.is_empty());
}

#[test]
fn test_invalid_condition_is_untouched() {
    // Arrange
    let condition = parse("id: 1..5, 2..3, x");
    let before = condition.values_group().clone();

    // Act
    let condition = ConditionOptimizer::new().optimize(condition);

    // Assert
    assert!(!condition.is_valid());
    assert_eq!(condition.values_group(), &before);
}

#[test]
fn test_incomparable_values_leave_bag_unchanged() {
    // Arrange
    let condition = optimized("balance: \"EUR 1\"..\"EUR 5\", \"USD 3\"..\"USD 9\", \"EUR 2\"");

    // Assert
    let balance = condition.values_group().field("balance").expect("balance");
    assert_eq!(balance.ranges.len(), 2);
    assert_eq!(balance.simple_values.len(), 1);
}

#[test]
fn test_optimizing_twice_is_stable() {
    // Arrange
    let once = optimized("id: 1..3[, [1..2, 4..6, ]6..9, 8, !1, !1..3; *(id: 5, 5..7)");

    // Act
    let twice = ConditionOptimizer::new().optimize(once.clone());

    // Assert
    assert_eq!(once.values_group(), twice.values_group());
}

// ========== Properties ==========

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    /// Renders `(lower, length, inclusive_lower, inclusive_upper, excluded)`.
    fn render_range(lower: i64, length: i64, inc_lower: bool, inc_upper: bool, excluded: bool) -> String {
        format!(
            "{}{}{}..{}{}",
            if excluded { "!" } else { "" },
            if inc_lower { "[" } else { "]" },
            lower,
            lower + length,
            if inc_upper { "]" } else { "[" },
        )
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0i64..40, any::<bool>()).prop_map(|(v, excluded)| {
                if excluded { format!("!{v}") } else { v.to_string() }
            }),
            (0i64..40, 1i64..8, any::<bool>(), any::<bool>(), any::<bool>())
                .prop_map(|(l, n, il, iu, ex)| render_range(l, n, il, iu, ex)),
        ]
    }

    fn query_strategy() -> impl Strategy<Value = String> {
        (
            proptest::collection::vec(value_strategy(), 1..12),
            proptest::collection::vec(value_strategy(), 0..6),
        )
            .prop_map(|(root, child)| {
                if child.is_empty() {
                    format!("id: {}", root.join(", "))
                } else {
                    format!("id: {}; *(id: {}; id: 45)", root.join(", "), child.join(", "))
                }
            })
    }

    fn record(id: i64) -> HashMap<String, Value> {
        HashMap::from([("id".to_string(), Value::Integer(id))])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: optimizing never changes which records match
        #[test]
        fn prop_optimize_preserves_matches(query in query_strategy()) {
            let condition = parse(&query);
            prop_assume!(condition.is_valid());
            let optimized = ConditionOptimizer::new().optimize(condition.clone());

            for id in -2..52 {
                prop_assert_eq!(
                    condition.matches(&record(id)),
                    optimized.matches(&record(id)),
                    "id {} with {}", id, query
                );
            }
        }

        /// Property: optimizing is idempotent
        #[test]
        fn prop_optimize_is_idempotent(query in query_strategy()) {
            let condition = parse(&query);
            prop_assume!(condition.is_valid());
            let once = ConditionOptimizer::new().optimize(condition);
            let twice = ConditionOptimizer::new().optimize(once.clone());

            prop_assert_eq!(once.values_group(), twice.values_group());
        }

        /// Property: merged date ranges cover exactly the same days
        #[test]
        fn prop_date_ranges_preserve_matches(
            ranges in proptest::collection::vec((0u32..60, 1u32..10, any::<bool>(), any::<bool>()), 1..8)
        ) {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
            let day = |offset: u32| start + chrono::Days::new(u64::from(offset));
            let views: Vec<String> = ranges
                .iter()
                .map(|&(lower, length, il, iu)| format!(
                    "{}{}..{}{}",
                    if il { "[" } else { "]" },
                    day(lower).format("%Y-%m-%d"),
                    day(lower + length).format("%Y-%m-%d"),
                    if iu { "]" } else { "[" },
                ))
                .collect();
            let query = format!("birthday: {}", views.join(", "));
            let condition = parse(&query);
            prop_assume!(condition.is_valid());
            let optimized = ConditionOptimizer::new().optimize(condition.clone());

            for offset in 0..75 {
                let record = HashMap::from([("birthday".to_string(), Value::Date(day(offset)))]);
                prop_assert_eq!(condition.matches(&record), optimized.matches(&record));
            }
        }
    }
}
