//! Fluent construction of conditions from code.
//!
//! Unlike input processors, the builder treats bad input as a programming
//! error: unknown fields, unparseable values, unsupported value kinds and
//! reversed ranges fail `build()` with a [`ConfigError`].
//!
//! ```rust,ignore
//! let condition = SearchConditionBuilder::new(field_set)
//!     .field("id", |v| v.simple("1").simple("2"))
//!     .group(Logical::Or, |g| g.field("name", |v| v.excluded("john")))
//!     .build()?;
//! ```

use std::sync::Arc;

use crate::error::ConfigError;
use crate::field::FieldSet;
use crate::value::Value;

use super::{
    params, render_template, Compare, CompareOp, Logical, PatternKind, PatternMatch, Range,
    SearchCondition, SingleValue, ValueKind, ValuesBag, ValuesGroup,
};

#[derive(Debug, Clone)]
enum Raw {
    View(String),
    Value(Value),
}

#[derive(Debug, Clone)]
enum Pending {
    Simple(Raw),
    Excluded(Raw),
    Range {
        lower: Raw,
        upper: Raw,
        inclusive_lower: bool,
        inclusive_upper: bool,
        excluded: bool,
    },
    Compare(CompareOp, Raw),
    Pattern(PatternMatch),
}

impl Pending {
    const fn kind(&self) -> ValueKind {
        match self {
            Self::Simple(_) => ValueKind::Simple,
            Self::Excluded(_) => ValueKind::Excluded,
            Self::Range { excluded: false, .. } => ValueKind::Range,
            Self::Range { excluded: true, .. } => ValueKind::ExcludedRange,
            Self::Compare(..) => ValueKind::Comparison,
            Self::Pattern(_) => ValueKind::Pattern,
        }
    }
}

/// Collects the values of one field.
#[derive(Debug, Clone, Default)]
pub struct ValuesBagBuilder {
    pending: Vec<Pending>,
}

impl ValuesBagBuilder {
    /// Adds a simple value given as view.
    #[must_use]
    pub fn simple(mut self, view: impl Into<String>) -> Self {
        self.pending.push(Pending::Simple(Raw::View(view.into())));
        self
    }

    /// Adds a simple, already normalized value.
    #[must_use]
    pub fn simple_value(mut self, value: Value) -> Self {
        self.pending.push(Pending::Simple(Raw::Value(value)));
        self
    }

    /// Adds an excluded value given as view.
    #[must_use]
    pub fn excluded(mut self, view: impl Into<String>) -> Self {
        self.pending.push(Pending::Excluded(Raw::View(view.into())));
        self
    }

    /// Adds an inclusive range given as views.
    #[must_use]
    pub fn range(self, lower: impl Into<String>, upper: impl Into<String>) -> Self {
        self.range_with(lower, upper, true, true, false)
    }

    /// Adds an inclusive excluded range given as views.
    #[must_use]
    pub fn excluded_range(self, lower: impl Into<String>, upper: impl Into<String>) -> Self {
        self.range_with(lower, upper, true, true, true)
    }

    /// Adds a range with explicit bounds.
    #[must_use]
    pub fn range_with(
        mut self,
        lower: impl Into<String>,
        upper: impl Into<String>,
        inclusive_lower: bool,
        inclusive_upper: bool,
        excluded: bool,
    ) -> Self {
        self.pending.push(Pending::Range {
            lower: Raw::View(lower.into()),
            upper: Raw::View(upper.into()),
            inclusive_lower,
            inclusive_upper,
            excluded,
        });
        self
    }

    /// Adds a comparison given as view.
    #[must_use]
    pub fn compare(mut self, operator: CompareOp, view: impl Into<String>) -> Self {
        self.pending
            .push(Pending::Compare(operator, Raw::View(view.into())));
        self
    }

    /// Adds a case-sensitive pattern matcher.
    #[must_use]
    pub fn pattern(mut self, kind: PatternKind, value: impl Into<String>) -> Self {
        self.pending
            .push(Pending::Pattern(PatternMatch::new(kind, value)));
        self
    }

    /// Adds a fully specified pattern matcher.
    #[must_use]
    pub fn pattern_match(mut self, pattern: PatternMatch) -> Self {
        self.pending.push(Pending::Pattern(pattern));
        self
    }

    fn resolve(self, field_set: &FieldSet, name: &str, bag: &mut ValuesBag) -> Result<(), ConfigError> {
        let field = field_set.get(name)?;
        let transformer = field.field_type().transformer();
        let comparator = field.field_type().comparator();

        // Normalized values are rendered and parsed again to pass the same
        // checks as views.
        let normalize = |raw: Raw| -> Result<SingleValue, ConfigError> {
            let view = match raw {
                Raw::View(view) => view,
                Raw::Value(value) => transformer.transform(&value),
            };
            transformer
                .reverse_transform(&view)
                .map(|value| SingleValue::new(view, value))
                .map_err(|failed| ConfigError::InvalidFieldValue {
                    field: name.to_string(),
                    message: render_template(&failed.template, &failed.parameters),
                })
        };

        for pending in self.pending {
            let kind = pending.kind();
            if !kind.is_accepted(field.options()) {
                return Err(ConfigError::UnsupportedValueKind {
                    field: name.to_string(),
                    kind: kind.label().to_string(),
                });
            }

            match pending {
                Pending::Simple(raw) => bag.simple_values.push(normalize(raw)?),
                Pending::Excluded(raw) => bag.excluded_simple_values.push(normalize(raw)?),
                Pending::Range {
                    lower,
                    upper,
                    inclusive_lower,
                    inclusive_upper,
                    excluded,
                } => {
                    let lower = normalize(lower)?;
                    let upper = normalize(upper)?;
                    let message = match comparator.is_lower(&lower.value, &upper.value) {
                        Ok(true) => None,
                        Ok(false) => Some(render_template(
                            "Lower range-value {{ lower }} should be lower than upper range-value {{ upper }}.",
                            &params([("lower", lower.view.clone()), ("upper", upper.view.clone())]),
                        )),
                        Err(error) => Some(error.to_string()),
                    };
                    if let Some(message) = message {
                        return Err(ConfigError::InvalidRange {
                            field: name.to_string(),
                            message,
                        });
                    }

                    let range = Range::new(lower, upper, inclusive_lower, inclusive_upper);
                    if excluded {
                        bag.excluded_ranges.push(range);
                    } else {
                        bag.ranges.push(range);
                    }
                }
                Pending::Compare(operator, raw) => {
                    bag.comparisons.push(Compare::new(operator, normalize(raw)?));
                }
                Pending::Pattern(pattern) => bag.pattern_matchers.push(pattern),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Field(String, ValuesBagBuilder),
    Group(GroupBuilder),
}

/// Collects the fields and subgroups of one group.
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    logical: Logical,
    entries: Vec<Entry>,
}

impl GroupBuilder {
    /// Creates an empty group builder.
    #[must_use]
    pub fn new(logical: Logical) -> Self {
        Self {
            logical,
            entries: Vec::new(),
        }
    }

    /// Adds values for `name`.
    #[must_use]
    pub fn field<F>(mut self, name: impl Into<String>, values: F) -> Self
    where
        F: FnOnce(ValuesBagBuilder) -> ValuesBagBuilder,
    {
        self.entries
            .push(Entry::Field(name.into(), values(ValuesBagBuilder::default())));
        self
    }

    /// Adds a nested group.
    #[must_use]
    pub fn group<F>(mut self, logical: Logical, build: F) -> Self
    where
        F: FnOnce(GroupBuilder) -> GroupBuilder,
    {
        self.entries.push(Entry::Group(build(Self::new(logical))));
        self
    }

    fn resolve(self, field_set: &FieldSet) -> Result<ValuesGroup, ConfigError> {
        let mut group = ValuesGroup::with_logical(self.logical);
        for entry in self.entries {
            match entry {
                Entry::Field(name, values) => {
                    values.resolve(field_set, &name, group.field_mut(&name))?;
                }
                Entry::Group(child) => {
                    group.add_group(child.resolve(field_set)?);
                }
            }
        }
        Ok(group)
    }
}

/// Builds a [`SearchCondition`] from code.
#[derive(Debug, Clone)]
pub struct SearchConditionBuilder {
    field_set: Arc<FieldSet>,
    root: GroupBuilder,
    primary: Option<GroupBuilder>,
}

impl SearchConditionBuilder {
    /// Starts an AND-rooted condition.
    #[must_use]
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        Self {
            field_set,
            root: GroupBuilder::default(),
            primary: None,
        }
    }

    /// Sets the root connector.
    #[must_use]
    pub fn logical(mut self, logical: Logical) -> Self {
        self.root.logical = logical;
        self
    }

    /// Adds values for `name` to the root group.
    #[must_use]
    pub fn field<F>(mut self, name: impl Into<String>, values: F) -> Self
    where
        F: FnOnce(ValuesBagBuilder) -> ValuesBagBuilder,
    {
        self.root = self.root.field(name, values);
        self
    }

    /// Adds a nested group to the root group.
    #[must_use]
    pub fn group<F>(mut self, logical: Logical, build: F) -> Self
    where
        F: FnOnce(GroupBuilder) -> GroupBuilder,
    {
        self.root = self.root.group(logical, build);
        self
    }

    /// Sets the primary condition.
    #[must_use]
    pub fn primary<F>(mut self, build: F) -> Self
    where
        F: FnOnce(GroupBuilder) -> GroupBuilder,
    {
        self.primary = Some(build(GroupBuilder::default()));
        self
    }

    /// Resolves all views and builds the condition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] for fields outside the field
    /// set, [`ConfigError::InvalidFieldValue`] for values the field type
    /// rejects, [`ConfigError::UnsupportedValueKind`] for value kinds the
    /// field does not accept and [`ConfigError::InvalidRange`] for ranges
    /// whose bounds are out of order.
    pub fn build(self) -> Result<SearchCondition, ConfigError> {
        let root = self.root.resolve(&self.field_set)?;
        let primary = self
            .primary
            .map(|p| p.resolve(&self.field_set))
            .transpose()?;

        let condition = SearchCondition::new(self.field_set, root);
        Ok(match primary {
            Some(primary) => condition.with_primary_condition(primary),
            None => condition,
        })
    }
}
