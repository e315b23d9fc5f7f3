//! Per-field value container.

use serde::{Deserialize, Serialize};

use super::values::{Compare, PatternMatch, Range, SingleValue};

/// All values given for one field within one group.
///
/// Inclusive kinds (simple values, ranges, comparisons other than `<>`,
/// positive patterns) select records; exclusive kinds (excluded values,
/// excluded ranges, `<>`, negated patterns) remove them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ValuesBag {
    /// Plain values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub simple_values: Vec<SingleValue>,
    /// Negated plain values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_simple_values: Vec<SingleValue>,
    /// Ranges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,
    /// Negated ranges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_ranges: Vec<Range>,
    /// Comparisons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comparisons: Vec<Compare>,
    /// Pattern matchers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pattern_matchers: Vec<PatternMatch>,
}

impl ValuesBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a simple value.
    #[must_use]
    pub fn with_simple(mut self, value: SingleValue) -> Self {
        self.simple_values.push(value);
        self
    }

    /// Adds an excluded simple value.
    #[must_use]
    pub fn with_excluded(mut self, value: SingleValue) -> Self {
        self.excluded_simple_values.push(value);
        self
    }

    /// Adds a range.
    #[must_use]
    pub fn with_range(mut self, range: Range) -> Self {
        self.ranges.push(range);
        self
    }

    /// Adds an excluded range.
    #[must_use]
    pub fn with_excluded_range(mut self, range: Range) -> Self {
        self.excluded_ranges.push(range);
        self
    }

    /// Adds a comparison.
    #[must_use]
    pub fn with_comparison(mut self, compare: Compare) -> Self {
        self.comparisons.push(compare);
        self
    }

    /// Adds a pattern matcher.
    #[must_use]
    pub fn with_pattern(mut self, pattern: PatternMatch) -> Self {
        self.pattern_matchers.push(pattern);
        self
    }

    /// Total number of values of every kind.
    #[must_use]
    pub fn count(&self) -> usize {
        self.simple_values.len()
            + self.excluded_simple_values.len()
            + self.ranges.len()
            + self.excluded_ranges.len()
            + self.comparisons.len()
            + self.pattern_matchers.len()
    }

    /// Returns `true` when the bag holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns `true` when at least one inclusive value is present.
    #[must_use]
    pub fn has_inclusive(&self) -> bool {
        !self.simple_values.is_empty()
            || !self.ranges.is_empty()
            || self.comparisons.iter().any(|c| !c.operator.is_exclusive())
            || self.pattern_matchers.iter().any(|p| !p.negated)
    }

    /// Returns `true` when at least one exclusive value is present.
    #[must_use]
    pub fn has_exclusive(&self) -> bool {
        !self.excluded_simple_values.is_empty()
            || !self.excluded_ranges.is_empty()
            || self.comparisons.iter().any(|c| c.operator.is_exclusive())
            || self.pattern_matchers.iter().any(|p| p.negated)
    }
}
