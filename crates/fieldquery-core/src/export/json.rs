//! Export to the JSON input format.

use serde_json::{json, Map, Value as Json};

use crate::condition::{Range, SearchCondition, SingleValue, ValuesBag, ValuesGroup};
use crate::field::FieldSet;

use super::{canonical_view, ConditionExporter};

/// Writes conditions in the format read by
/// [`JsonInput`](crate::input::JsonInput).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    /// Creates a compact exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an exporter producing indented output.
    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Exports the user condition as a JSON value.
    #[must_use]
    pub fn to_value(&self, condition: &SearchCondition) -> Json {
        export_group(condition.field_set(), condition.values_group())
    }
}

impl ConditionExporter for JsonExporter {
    fn export(&self, condition: &SearchCondition) -> String {
        let value = self.to_value(condition);
        if self.pretty {
            format!("{value:#}")
        } else {
            value.to_string()
        }
    }
}

fn export_group(field_set: &FieldSet, group: &ValuesGroup) -> Json {
    let mut object = Map::new();
    object.insert("logical-case".into(), json!(group.logical()));

    let fields: Map<String, Json> = group
        .fields()
        .iter()
        .filter(|(_, bag)| !bag.is_empty())
        .map(|(name, bag)| (name.clone(), export_bag(field_set, name, bag)))
        .collect();
    if !fields.is_empty() {
        object.insert("fields".into(), Json::Object(fields));
    }

    if !group.groups().is_empty() {
        let groups = group
            .groups()
            .iter()
            .map(|child| export_group(field_set, child))
            .collect();
        object.insert("groups".into(), Json::Array(groups));
    }
    Json::Object(object)
}

fn export_bag(field_set: &FieldSet, field: &str, bag: &ValuesBag) -> Json {
    let view = |value: &SingleValue| Json::String(canonical_view(field_set, field, value));
    let range = |range: &Range| {
        let mut object = Map::new();
        object.insert("lower".into(), view(&range.lower));
        object.insert("upper".into(), view(&range.upper));
        if !range.inclusive_lower {
            object.insert("inclusive-lower".into(), Json::Bool(false));
        }
        if !range.inclusive_upper {
            object.insert("inclusive-upper".into(), Json::Bool(false));
        }
        Json::Object(object)
    };

    let mut object = Map::new();
    let mut put = |key: &str, values: Vec<Json>| {
        if !values.is_empty() {
            object.insert(key.into(), Json::Array(values));
        }
    };

    put("simple-values", bag.simple_values.iter().map(view).collect());
    put(
        "excluded-simple-values",
        bag.excluded_simple_values.iter().map(view).collect(),
    );
    put("ranges", bag.ranges.iter().map(range).collect());
    put("excluded-ranges", bag.excluded_ranges.iter().map(range).collect());
    put(
        "comparisons",
        bag.comparisons
            .iter()
            .map(|compare| json!({ "operator": compare.operator, "value": view(&compare.value) }))
            .collect(),
    );
    put(
        "pattern-matchers",
        bag.pattern_matchers
            .iter()
            .map(|pattern| {
                json!({
                    "type": pattern.kind,
                    "value": pattern.value,
                    "case-insensitive": pattern.case_insensitive,
                    "negated": pattern.negated,
                })
            })
            .collect(),
    );

    Json::Object(object)
}
