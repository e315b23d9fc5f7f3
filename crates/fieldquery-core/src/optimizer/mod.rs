//! Condition optimizer.
//!
//! Rewrites a condition into a smaller one that matches exactly the same
//! records:
//!
//! - overlapping, touching and adjacent ranges are merged (`[1,5]` and
//!   `[6,10]` become `[1,10]` for integers)
//! - simple values inside a range are dropped, excluded values inside an
//!   excluded range likewise
//! - duplicate values, comparisons and patterns are dropped
//!
//! Optimizing an optimized condition returns it unchanged.

mod ranges;
#[cfg(test)]
mod tests;

use crate::condition::{Compare, PatternMatch, SearchCondition, ValuesBag, ValuesGroup};
use crate::field::FieldSet;
use crate::value::{ComparisonError, ValueComparator};

/// Simplifies conditions without changing their meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionOptimizer;

impl ConditionOptimizer {
    /// Creates the optimizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Optimizes the user condition and the primary condition independently.
    ///
    /// Conditions with errors are returned untouched.
    #[must_use]
    pub fn optimize(&self, condition: SearchCondition) -> SearchCondition {
        if condition.has_errors() {
            tracing::debug!(
                errors = condition.errors().len(),
                "skipping optimization of invalid condition"
            );
            return condition;
        }

        let mut parts = condition.into_parts();
        let before = parts.root.count_values();
        self.optimize_group(&parts.field_set, &mut parts.root);
        if let Some(primary) = parts.primary.as_mut() {
            self.optimize_group(&parts.field_set, primary);
        }
        tracing::debug!(
            field_set = parts.field_set.name(),
            before,
            after = parts.root.count_values(),
            "condition optimized"
        );

        SearchCondition::from_parts(parts)
    }

    /// Optimizes `group` and its subgroups in place.
    pub fn optimize_group(&self, field_set: &FieldSet, group: &mut ValuesGroup) {
        for (name, bag) in group.fields_mut() {
            let Some(field) = field_set.find(name) else {
                continue;
            };
            if let Err(error) = optimize_bag(field.field_type().comparator(), bag) {
                tracing::debug!(field = %name, %error, "values left unoptimized");
            }
        }
        for child in group.groups_mut() {
            self.optimize_group(field_set, child);
        }
    }
}

/// Replaces the bag's content only when every step succeeded.
fn optimize_bag(comparator: &dyn ValueComparator, bag: &mut ValuesBag) -> Result<(), ComparisonError> {
    let merged_ranges = ranges::merge(comparator, bag.ranges.clone())?;
    let merged_excluded = ranges::merge(comparator, bag.excluded_ranges.clone())?;
    let simple = ranges::outside(
        comparator,
        ranges::dedupe(comparator, &bag.simple_values)?,
        &merged_ranges,
    )?;
    let excluded = ranges::outside(
        comparator,
        ranges::dedupe(comparator, &bag.excluded_simple_values)?,
        &merged_excluded,
    )?;
    let comparisons = dedupe_comparisons(comparator, &bag.comparisons)?;
    let patterns = dedupe_patterns(&bag.pattern_matchers);

    bag.ranges = merged_ranges;
    bag.excluded_ranges = merged_excluded;
    bag.simple_values = simple;
    bag.excluded_simple_values = excluded;
    bag.comparisons = comparisons;
    bag.pattern_matchers = patterns;
    Ok(())
}

fn dedupe_comparisons(
    comparator: &dyn ValueComparator,
    comparisons: &[Compare],
) -> Result<Vec<Compare>, ComparisonError> {
    let mut kept: Vec<Compare> = Vec::with_capacity(comparisons.len());
    for compare in comparisons {
        let mut seen = false;
        for existing in kept.iter().filter(|c| c.operator == compare.operator) {
            if comparator.is_equal(&existing.value.value, &compare.value.value)? {
                seen = true;
                break;
            }
        }
        if !seen {
            kept.push(compare.clone());
        }
    }
    Ok(kept)
}

fn dedupe_patterns(patterns: &[PatternMatch]) -> Vec<PatternMatch> {
    let mut kept: Vec<PatternMatch> = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        if !kept.contains(pattern) {
            kept.push(pattern.clone());
        }
    }
    kept
}
