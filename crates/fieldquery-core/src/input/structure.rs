//! Validation shared by all input processors.
//!
//! Processors only decode syntax; every value goes through
//! [`StructureBuilder`], which owns limits, capability checks, value
//! transformation, range ordering, duplicate detection and error paths.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::condition::{
    params, Compare, CompareOp, ConditionErrorMessage, PatternMatch, Range, SearchCondition,
    SingleValue, ValueKind, ValuesBag, ValuesGroup,
};
use crate::field::FieldConfig;
use crate::value::ValueComparator;

use super::ProcessorConfig;

/// A value as decoded from input, before transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawValue {
    Simple(String),
    Excluded(String),
    Range {
        lower: String,
        upper: String,
        inclusive_lower: bool,
        inclusive_upper: bool,
        excluded: bool,
    },
    Compare(CompareOp, String),
    Pattern(PatternMatch),
}

impl RawValue {
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

/// Location of a group in the tree being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupPath {
    prefix: String,
    level: usize,
}

impl GroupPath {
    pub(crate) fn root() -> Self {
        Self {
            prefix: String::new(),
            level: 0,
        }
    }

    fn child(&self, index: usize) -> Self {
        Self {
            prefix: format!("{}groups[{index}].", self.prefix),
            level: self.level + 1,
        }
    }

    fn group_path(&self) -> &str {
        self.prefix.trim_end_matches('.')
    }

    fn field_path(&self, field: &str) -> String {
        format!("{}fields.{field}", self.prefix)
    }
}

pub(crate) struct StructureBuilder<'c> {
    config: &'c ProcessorConfig,
    errors: Vec<ConditionErrorMessage>,
    warnings: Vec<ConditionErrorMessage>,
    counters: FxHashMap<String, usize>,
    reported: FxHashSet<String>,
    root_fields: FxHashSet<String>,
}

impl<'c> StructureBuilder<'c> {
    pub(crate) fn new(config: &'c ProcessorConfig) -> Self {
        Self {
            config,
            errors: Vec::new(),
            warnings: Vec::new(),
            counters: FxHashMap::default(),
            reported: FxHashSet::default(),
            root_fields: FxHashSet::default(),
        }
    }

    /// Records an error that is not tied to a specific value.
    pub(crate) fn add_error(&mut self, error: ConditionErrorMessage) {
        self.errors.push(error);
    }

    /// Checks whether `parent` may receive one more subgroup.
    ///
    /// Returns the child's path, or `None` when a limit is exceeded; the
    /// caller must then skip the subgroup's content.
    pub(crate) fn open_group(
        &mut self,
        parent: &mut ValuesGroup,
        at: &GroupPath,
    ) -> Option<GroupPath> {
        let max_nesting = self.config.max_nesting_level();
        let max_groups = self.config.max_groups();
        let index = parent.groups().len();
        let child = at.child(index);

        if child.level > max_nesting {
            tracing::warn!(path = child.group_path(), max_nesting, "group nesting limit exceeded");
            self.errors.push(
                ConditionErrorMessage::new(
                    child.group_path(),
                    "Group nesting level of {{ max }} is exceeded.",
                    params([("max", max_nesting.to_string())]),
                )
                .with_plural(max_nesting as u64),
            );
            parent.mark_errors();
            return None;
        }

        if index >= max_groups {
            if self.reported.insert(format!("{}#groups", at.prefix)) {
                tracing::warn!(path = at.group_path(), max_groups, "group count limit exceeded");
                self.errors.push(
                    ConditionErrorMessage::new(
                        at.group_path(),
                        "Maximum number of groups {{ max }} is exceeded.",
                        params([("max", max_groups.to_string())]),
                    )
                    .with_plural(max_groups as u64),
                );
            }
            parent.mark_errors();
            return None;
        }

        Some(child)
    }

    /// Checks that `name` belongs to the field set.
    pub(crate) fn accept_field(&mut self, group: &mut ValuesGroup, at: &GroupPath, name: &str) -> bool {
        let field_set = self.config.field_set();
        if field_set.has(name) {
            if at.level == 0 {
                self.root_fields.insert(name.to_string());
            }
            return true;
        }
        self.errors.push(ConditionErrorMessage::new(
            at.field_path(name),
            "The field \"{{ field }}\" is not registered in the FieldSet.",
            params([
                ("field", name.to_string()),
                ("field_set", field_set.name().to_string()),
            ]),
        ));
        group.mark_errors();
        false
    }

    /// Validates `raw` and adds it to the bag of `name` in `group`.
    pub(crate) fn add_value(
        &mut self,
        group: &mut ValuesGroup,
        at: &GroupPath,
        name: &str,
        raw: RawValue,
    ) {
        let field_set = std::sync::Arc::clone(self.config.field_set());
        let Some(field) = field_set.find(name) else {
            return;
        };

        let kind = raw.kind();
        let field_path = at.field_path(name);
        let slot = format!("{field_path}.{}", kind.path_segment());
        let index = {
            let counter = self.counters.entry(slot.clone()).or_insert(0);
            let index = *counter;
            *counter += 1;
            index
        };
        let path = format!("{slot}[{index}]");

        let max_values = self.config.max_values();
        if group.field(name).map_or(0, ValuesBag::count) >= max_values {
            if self.reported.insert(format!("{field_path}#values")) {
                tracing::warn!(path = %field_path, max_values, "value count limit exceeded");
                self.errors.push(
                    ConditionErrorMessage::new(
                        field_path,
                        "Maximum number of values {{ max }} per field is exceeded.",
                        params([("max", max_values.to_string())]),
                    )
                    .with_plural(max_values as u64),
                );
            }
            group.mark_errors();
            return;
        }

        if !kind.is_accepted(field.options()) {
            self.errors.push(ConditionErrorMessage::new(
                path,
                "The field \"{{ field }}\" does not accept {{ kind }}.",
                params([
                    ("field", name.to_string()),
                    ("kind", kind.label().to_string()),
                ]),
            ));
            group.mark_errors();
            return;
        }

        if !self.push_value(group, field, &path, raw) {
            group.mark_errors();
        }
    }

    /// Transforms and stores one value; returns `false` on a validation error.
    fn push_value(
        &mut self,
        group: &mut ValuesGroup,
        field: &FieldConfig,
        path: &str,
        raw: RawValue,
    ) -> bool {
        let name = field.name();
        match raw {
            RawValue::Simple(view) => {
                let Some(value) = self.transform(field, path, view) else {
                    return false;
                };
                let bag = group.field_mut(name);
                if contains_value(field, &bag.simple_values, &value) {
                    self.duplicate(path, &value.view);
                } else {
                    bag.simple_values.push(value);
                }
            }
            RawValue::Excluded(view) => {
                let Some(value) = self.transform(field, path, view) else {
                    return false;
                };
                let bag = group.field_mut(name);
                if contains_value(field, &bag.excluded_simple_values, &value) {
                    self.duplicate(path, &value.view);
                } else {
                    bag.excluded_simple_values.push(value);
                }
            }
            RawValue::Range {
                lower,
                upper,
                inclusive_lower,
                inclusive_upper,
                excluded,
            } => {
                let lower = self.transform(field, &format!("{path}.lower"), lower);
                let upper = self.transform(field, &format!("{path}.upper"), upper);
                let (Some(lower), Some(upper)) = (lower, upper) else {
                    return false;
                };
                if !self.check_range_order(field, path, &lower, &upper) {
                    return false;
                }
                let range = Range::new(lower, upper, inclusive_lower, inclusive_upper);
                let bag = group.field_mut(name);
                let target = if excluded {
                    &mut bag.excluded_ranges
                } else {
                    &mut bag.ranges
                };
                if target.contains(&range) {
                    let view = format!("{}..{}", range.lower.view, range.upper.view);
                    self.duplicate(path, &view);
                } else {
                    target.push(range);
                }
            }
            RawValue::Compare(operator, view) => {
                let Some(value) = self.transform(field, path, view) else {
                    return false;
                };
                let compare = Compare::new(operator, value);
                let bag = group.field_mut(name);
                if bag.comparisons.contains(&compare) {
                    let view = format!("{operator}{}", compare.value.view);
                    self.duplicate(path, &view);
                } else {
                    bag.comparisons.push(compare);
                }
            }
            RawValue::Pattern(pattern) => {
                let bag = group.field_mut(name);
                if bag.pattern_matchers.contains(&pattern) {
                    let view = pattern.value.clone();
                    self.duplicate(path, &view);
                } else {
                    bag.pattern_matchers.push(pattern);
                }
            }
        }
        true
    }

    fn transform(&mut self, field: &FieldConfig, path: &str, view: String) -> Option<SingleValue> {
        match field.field_type().transformer().reverse_transform(&view) {
            Ok(value) => Some(SingleValue::new(view, value)),
            Err(failed) => {
                self.errors
                    .push(ConditionErrorMessage::new(path, failed.template, failed.parameters));
                None
            }
        }
    }

    fn check_range_order(
        &mut self,
        field: &FieldConfig,
        path: &str,
        lower: &SingleValue,
        upper: &SingleValue,
    ) -> bool {
        let comparator: &dyn ValueComparator = field.field_type().comparator();
        match comparator.is_lower(&lower.value, &upper.value) {
            Ok(true) => true,
            Ok(false) => {
                self.errors.push(ConditionErrorMessage::new(
                    path,
                    "Lower range-value {{ lower }} should be lower than upper range-value {{ upper }}.",
                    params([
                        ("lower", lower.view.clone()),
                        ("upper", upper.view.clone()),
                    ]),
                ));
                false
            }
            Err(error) => {
                self.errors.push(ConditionErrorMessage::new(
                    path,
                    "The values {{ lower }} and {{ upper }} cannot be compared.",
                    params([
                        ("lower", lower.view.clone()),
                        ("upper", upper.view.clone()),
                        ("reason", error.to_string()),
                    ]),
                ));
                false
            }
        }
    }

    fn duplicate(&mut self, path: &str, view: &str) {
        tracing::warn!(path, value = view, "duplicate value ignored");
        self.warnings.push(ConditionErrorMessage::new(
            path,
            "Duplicate value {{ value }} is ignored.",
            params([("value", view.to_string())]),
        ));
    }

    /// Checks required fields and wraps up the condition.
    pub(crate) fn finish(mut self, mut root: ValuesGroup) -> SearchCondition {
        let field_set = std::sync::Arc::clone(self.config.field_set());
        for field in field_set.iter() {
            if field.options().required && !self.root_fields.contains(field.name()) {
                self.errors.push(ConditionErrorMessage::new(
                    GroupPath::root().field_path(field.name()),
                    "The field \"{{ field }}\" is required.",
                    params([("field", field.name().to_string())]),
                ));
                root.mark_errors();
            }
        }

        tracing::debug!(
            field_set = field_set.name(),
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            values = root.count_values(),
            "input processed"
        );
        SearchCondition::with_messages(field_set, root, self.errors, self.warnings)
    }
}

fn contains_value(field: &FieldConfig, values: &[SingleValue], candidate: &SingleValue) -> bool {
    let comparator = field.field_type().comparator();
    values.iter().any(|existing| {
        comparator
            .is_equal(&existing.value, &candidate.value)
            .unwrap_or(existing.value == candidate.value)
    })
}
