//! Value kinds held by a [`ValuesBag`](super::ValuesBag).

use std::fmt;

use serde::{Deserialize, Serialize};

use std::cmp::Ordering;

use crate::field::FieldOptions;
use crate::value::{ComparisonError, Value, ValueComparator};

/// The six kinds of values a [`ValuesBag`](super::ValuesBag) holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Simple,
    Excluded,
    Range,
    ExcludedRange,
    Comparison,
    Pattern,
}

impl ValueKind {
    /// Segment used in error paths, e.g. `fields.id.ranges[0]`.
    pub(crate) const fn path_segment(self) -> &'static str {
        match self {
            Self::Simple => "simple-values",
            Self::Excluded => "excluded-simple-values",
            Self::Range => "ranges",
            Self::ExcludedRange => "excluded-ranges",
            Self::Comparison => "comparisons",
            Self::Pattern => "pattern-matchers",
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Simple | Self::Excluded => "values",
            Self::Range | Self::ExcludedRange => "ranges",
            Self::Comparison => "comparisons",
            Self::Pattern => "pattern matchers",
        }
    }

    pub(crate) const fn is_accepted(self, options: FieldOptions) -> bool {
        match self {
            Self::Simple | Self::Excluded => true,
            Self::Range | Self::ExcludedRange => options.accept_ranges,
            Self::Comparison => options.accept_compares,
            Self::Pattern => options.accept_pattern_match,
        }
    }
}

/// A value as typed by the user together with its normalized form.
///
/// Equality only considers the normalized value: `"01"` and `"1"` are the
/// same integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleValue {
    /// Original textual representation.
    pub view: String,
    /// Normalized value.
    pub value: Value,
}

impl SingleValue {
    /// Creates a value from its view and normalized form.
    #[must_use]
    pub fn new(view: impl Into<String>, value: Value) -> Self {
        Self {
            view: view.into(),
            value,
        }
    }

    /// Creates a value whose view is the value's own display form.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self {
            view: value.to_string(),
            value,
        }
    }
}

impl PartialEq for SingleValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for SingleValue {}

/// Range between two bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound.
    pub lower: SingleValue,
    /// Upper bound.
    pub upper: SingleValue,
    /// Lower bound is part of the range.
    pub inclusive_lower: bool,
    /// Upper bound is part of the range.
    pub inclusive_upper: bool,
}

impl Range {
    /// Creates an inclusive range.
    #[must_use]
    pub fn inclusive(lower: SingleValue, upper: SingleValue) -> Self {
        Self::new(lower, upper, true, true)
    }

    /// Creates a range with explicit bound inclusiveness.
    #[must_use]
    pub fn new(
        lower: SingleValue,
        upper: SingleValue,
        inclusive_lower: bool,
        inclusive_upper: bool,
    ) -> Self {
        Self {
            lower,
            upper,
            inclusive_lower,
            inclusive_upper,
        }
    }

    /// Returns `true` if `value` lies within the range.
    ///
    /// # Errors
    ///
    /// Propagates comparator failures (wrong type, foreign currency).
    pub fn contains(
        &self,
        comparator: &dyn ValueComparator,
        value: &Value,
    ) -> Result<bool, ComparisonError> {
        let above = match comparator.compare(value, &self.lower.value)? {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive_lower,
            Ordering::Less => false,
        };
        if !above {
            return Ok(false);
        }
        Ok(match comparator.compare(value, &self.upper.value)? {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive_upper,
            Ordering::Greater => false,
        })
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `<>`
    #[serde(rename = "<>")]
    Ne,
}

impl CompareOp {
    /// Operator as written in queries and SQL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Ne => "<>",
        }
    }

    /// Parses an operator symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<>" => Some(Self::Ne),
            _ => None,
        }
    }

    /// `<>` removes records instead of selecting them.
    #[must_use]
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::Ne)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison of the field against a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compare {
    /// Operator.
    pub operator: CompareOp,
    /// Right-hand operand.
    pub value: SingleValue,
}

impl Compare {
    /// Creates a comparison.
    #[must_use]
    pub fn new(operator: CompareOp, value: SingleValue) -> Self {
        Self { operator, value }
    }
}

/// Text pattern kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    /// Value occurs anywhere.
    Contains,
    /// Value is a prefix.
    StartsWith,
    /// Value is a suffix.
    EndsWith,
    /// Whole text equals value.
    Equals,
}

impl PatternKind {
    /// Symbol following `~` in the string syntax.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Contains => '*',
            Self::StartsWith => '>',
            Self::EndsWith => '<',
            Self::Equals => '=',
        }
    }

    /// Parses the symbol following `~`.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '*' => Some(Self::Contains),
            '>' => Some(Self::StartsWith),
            '<' => Some(Self::EndsWith),
            '=' => Some(Self::Equals),
            _ => None,
        }
    }

    /// Name used in JSON and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::Equals => "EQUALS",
        }
    }
}

/// Text pattern match. The value is raw text and is never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Pattern kind.
    pub kind: PatternKind,
    /// Literal text to look for.
    pub value: String,
    /// Compare lower-cased.
    pub case_insensitive: bool,
    /// Select records that do NOT match.
    pub negated: bool,
}

impl PatternMatch {
    /// Creates a case-sensitive, non-negated pattern.
    #[must_use]
    pub fn new(kind: PatternKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            case_insensitive: false,
            negated: false,
        }
    }

    /// Makes the pattern case-insensitive.
    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Negates the pattern.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }
}
