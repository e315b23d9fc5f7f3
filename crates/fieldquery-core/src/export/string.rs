//! Export to the string query syntax.

use crate::condition::{Logical, Range, SearchCondition, SingleValue, ValuesBag, ValuesGroup};
use crate::field::FieldSet;
use crate::input::is_bare_literal;

use super::{canonical_view, ConditionExporter};

/// Writes conditions in the syntax read by
/// [`StringQueryInput`](crate::input::StringQueryInput).
#[derive(Debug, Clone, Copy, Default)]
pub struct StringExporter;

impl StringExporter {
    /// Creates the exporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConditionExporter for StringExporter {
    fn export(&self, condition: &SearchCondition) -> String {
        let root = condition.values_group();
        let body = export_group(condition.field_set(), root);

        match root.logical() {
            Logical::Or => format!("*{body}"),
            // A leading `*` would make the root OR; start with an empty item.
            Logical::And if body.starts_with('*') => format!("; {body}"),
            Logical::And => body,
        }
    }
}

fn export_group(field_set: &FieldSet, group: &ValuesGroup) -> String {
    let fields = group
        .fields()
        .iter()
        .filter(|(_, bag)| !bag.is_empty())
        .map(|(name, bag)| format!("{name}: {}", export_bag(field_set, name, bag)));
    let groups = group.groups().iter().map(|child| {
        let prefix = match child.logical() {
            Logical::And => "",
            Logical::Or => "*",
        };
        format!("{prefix}({})", export_group(field_set, child))
    });

    fields.chain(groups).collect::<Vec<_>>().join("; ")
}

fn export_bag(field_set: &FieldSet, field: &str, bag: &ValuesBag) -> String {
    let view = |value: &SingleValue| literal(&canonical_view(field_set, field, value));
    let range = |range: &Range| {
        format!(
            "{}{}..{}{}",
            if range.inclusive_lower { "" } else { "]" },
            view(&range.lower),
            view(&range.upper),
            if range.inclusive_upper { "" } else { "[" },
        )
    };

    let mut values = Vec::with_capacity(bag.count());
    values.extend(bag.simple_values.iter().map(view));
    values.extend(
        bag.excluded_simple_values
            .iter()
            .map(|value| format!("!{}", view(value))),
    );
    values.extend(bag.ranges.iter().map(range));
    values.extend(bag.excluded_ranges.iter().map(|r| format!("!{}", range(r))));
    values.extend(
        bag.comparisons
            .iter()
            .map(|compare| format!("{}{}", compare.operator, view(&compare.value))),
    );
    values.extend(bag.pattern_matchers.iter().map(|pattern| {
        format!(
            "~{}{}{}{}",
            if pattern.case_insensitive { "i" } else { "" },
            if pattern.negated { "!" } else { "" },
            pattern.kind.symbol(),
            literal(&pattern.value),
        )
    }));

    values.join(", ")
}

/// Quotes `text` unless it can be written bare.
fn literal(text: &str) -> String {
    if is_bare_literal(text) {
        text.to_string()
    } else {
        format!("\"{}\"", text.replace('"', "\"\""))
    }
}
