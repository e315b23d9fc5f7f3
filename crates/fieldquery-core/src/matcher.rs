//! In-memory evaluation of conditions.
//!
//! [`SearchCondition::matches`] applies the same semantics as the generated
//! SQL to a single record: a missing field behaves like `NULL` (every
//! predicate on it is false), empty bags and groups are skipped, and
//! patterns go through the same `LIKE` escaping as the SQL backends.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;

use crate::condition::{
    CompareOp, Logical, PatternKind, PatternMatch, Range, SearchCondition, ValuesBag, ValuesGroup,
};
use crate::field::FieldSet;
use crate::sql::{like_pattern, LIKE_ESCAPE};
use crate::value::{Value, ValueComparator};

/// A record that can be matched: field name to value.
pub trait Record {
    /// Value of `field`, or `None` for `NULL`.
    fn value(&self, field: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn value(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }
}

impl<S: BuildHasher> Record for IndexMap<String, Value, S> {
    fn value(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }
}

impl Record for BTreeMap<String, Value> {
    fn value(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }
}

impl SearchCondition {
    /// Evaluates the condition (and its primary condition) against `record`.
    ///
    /// Invalid conditions match nothing.
    #[must_use]
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        if self.has_errors() {
            return false;
        }
        let field_set = self.field_set();
        let primary = self
            .primary_condition()
            .and_then(|group| group_matches(field_set, group, record));
        let user = group_matches(field_set, self.values_group(), record);
        primary.unwrap_or(true) && user.unwrap_or(true)
    }
}

/// `None` when the group has nothing to test.
fn group_matches<R: Record + ?Sized>(field_set: &FieldSet, group: &ValuesGroup, record: &R) -> Option<bool> {
    let fields = group
        .fields()
        .iter()
        .filter_map(|(name, bag)| bag_matches(field_set, name, bag, record));
    let groups = group
        .groups()
        .iter()
        .filter_map(|child| group_matches(field_set, child, record));

    let mut results = fields.chain(groups).peekable();
    results.peek()?;
    Some(match group.logical() {
        Logical::And => results.all(|matched| matched),
        Logical::Or => results.any(|matched| matched),
    })
}

fn bag_matches<R: Record + ?Sized>(
    field_set: &FieldSet,
    name: &str,
    bag: &ValuesBag,
    record: &R,
) -> Option<bool> {
    if bag.is_empty() {
        return None;
    }
    let (Some(field), Some(value)) = (field_set.find(name), record.value(name)) else {
        return Some(false);
    };
    let comparator = field.field_type().comparator();
    let eq = |other: &Value| comparator.is_equal(value, other).unwrap_or(false);
    let in_range = |range: &Range| range.contains(comparator, value).unwrap_or(false);

    let inclusive = bag.has_inclusive().then(|| {
        bag.simple_values.iter().any(|v| eq(&v.value))
            || bag.ranges.iter().any(in_range)
            || bag
                .comparisons
                .iter()
                .filter(|c| !c.operator.is_exclusive())
                .any(|c| compare_matches(comparator, value, c.operator, &c.value.value))
            || bag
                .pattern_matchers
                .iter()
                .filter(|p| !p.negated)
                .any(|p| pattern_matches(p, value))
    });

    let exclusive = bag.has_exclusive().then(|| {
        bag.excluded_simple_values
            .iter()
            .all(|v| comparator.is_equal(value, &v.value).is_ok_and(|equal| !equal))
            && bag
                .excluded_ranges
                .iter()
                .all(|r| r.contains(comparator, value).is_ok_and(|inside| !inside))
            && bag
                .comparisons
                .iter()
                .filter(|c| c.operator.is_exclusive())
                .all(|c| compare_matches(comparator, value, c.operator, &c.value.value))
            && bag
                .pattern_matchers
                .iter()
                .filter(|p| p.negated)
                .all(|p| pattern_matches(p, value))
    });

    Some(inclusive.unwrap_or(true) && exclusive.unwrap_or(true))
}

fn compare_matches(
    comparator: &dyn ValueComparator,
    value: &Value,
    operator: CompareOp,
    operand: &Value,
) -> bool {
    let Ok(order) = comparator.compare(value, operand) else {
        return false;
    };
    match operator {
        CompareOp::Lt => order.is_lt(),
        CompareOp::Lte => order.is_le(),
        CompareOp::Gt => order.is_gt(),
        CompareOp::Gte => order.is_ge(),
        CompareOp::Ne => order.is_ne(),
    }
}

/// Result of the SQL predicate for `pattern`, negation included.
fn pattern_matches(pattern: &PatternMatch, value: &Value) -> bool {
    let text = value
        .as_text()
        .map_or_else(|| value.to_string(), str::to_string);

    let matched = if pattern.kind == PatternKind::Equals {
        if pattern.case_insensitive {
            text.to_lowercase() == pattern.value.to_lowercase()
        } else {
            text == pattern.value
        }
    } else {
        let like = like_pattern(pattern.kind, &pattern.value, LIKE_ESCAPE);
        like_match(&text, &like, LIKE_ESCAPE, pattern.case_insensitive)
    };
    matched != pattern.negated
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    /// `%`
    Any,
    /// `_`
    One,
    Char(char),
}

fn tokenize_like(pattern: &str, escape: char) -> Vec<LikeToken> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            c if c == escape => LikeToken::Char(chars.next().unwrap_or(escape)),
            '%' => LikeToken::Any,
            '_' => LikeToken::One,
            c => LikeToken::Char(c),
        });
    }
    tokens
}

/// SQL `LIKE` with an escape character.
///
/// Dynamic programming over characters: `reachable[i]` is true when the
/// first `i` characters of `text` match the pattern tokens seen so far.
pub(crate) fn like_match(text: &str, pattern: &str, escape: char, case_insensitive: bool) -> bool {
    let (text, pattern) = if case_insensitive {
        (text.to_lowercase(), pattern.to_lowercase())
    } else {
        (text.to_string(), pattern.to_string())
    };
    let text: Vec<char> = text.chars().collect();
    let n = text.len();

    let mut reachable = vec![false; n + 1];
    reachable[0] = true;
    for token in tokenize_like(&pattern, escape) {
        let mut next = vec![false; n + 1];
        match token {
            LikeToken::Any => {
                let mut seen = false;
                for i in 0..=n {
                    seen |= reachable[i];
                    next[i] = seen;
                }
            }
            LikeToken::One => {
                for i in 1..=n {
                    next[i] = reachable[i - 1];
                }
            }
            LikeToken::Char(c) => {
                for i in 1..=n {
                    next[i] = reachable[i - 1] && text[i - 1] == c;
                }
            }
        }
        reachable = next;
    }
    reachable[n]
}
