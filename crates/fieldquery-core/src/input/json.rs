//! JSON processor.
//!
//! The document mirrors the condition tree:
//!
//! ```json
//! {
//!   "logical-case": "AND",
//!   "fields": {
//!     "id": { "simple-values": [1, 2], "ranges": [{ "lower": 5, "upper": 10 }] }
//!   },
//!   "groups": [
//!     { "logical-case": "OR", "fields": { "name": { "pattern-matchers": [
//!       { "type": "CONTAINS", "value": "jo", "case-insensitive": true }
//!     ] } } }
//!   ]
//! }
//! ```
//!
//! Unknown keys and wrongly typed entries are syntax errors, reported with
//! the line and column serde points at.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::condition::{CompareOp, Logical, PatternKind, PatternMatch, SearchCondition, ValuesGroup};

use super::structure::{GroupPath, RawValue, StructureBuilder};
use super::syntax_error::{SyntaxError, SyntaxErrorKind};
use super::{InputProcessor, ProcessorConfig};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct JsonGroup {
    #[serde(default)]
    logical_case: Logical,
    #[serde(default)]
    fields: IndexMap<String, JsonBag>,
    #[serde(default)]
    groups: Vec<JsonGroup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct JsonBag {
    #[serde(default)]
    simple_values: Vec<JsonScalar>,
    #[serde(default)]
    excluded_simple_values: Vec<JsonScalar>,
    #[serde(default)]
    ranges: Vec<JsonRange>,
    #[serde(default)]
    excluded_ranges: Vec<JsonRange>,
    #[serde(default)]
    comparisons: Vec<JsonCompare>,
    #[serde(default)]
    pattern_matchers: Vec<JsonPattern>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl JsonScalar {
    fn into_view(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

const fn yes() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct JsonRange {
    lower: JsonScalar,
    upper: JsonScalar,
    #[serde(default = "yes")]
    inclusive_lower: bool,
    #[serde(default = "yes")]
    inclusive_upper: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonCompare {
    operator: CompareOp,
    value: JsonScalar,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct JsonPattern {
    #[serde(rename = "type")]
    kind: PatternKind,
    value: String,
    #[serde(default)]
    case_insensitive: bool,
    #[serde(default)]
    negated: bool,
}

impl JsonBag {
    fn into_raw_values(self) -> impl Iterator<Item = RawValue> {
        let range = |excluded: bool| {
            move |r: JsonRange| RawValue::Range {
                lower: r.lower.into_view(),
                upper: r.upper.into_view(),
                inclusive_lower: r.inclusive_lower,
                inclusive_upper: r.inclusive_upper,
                excluded,
            }
        };

        self.simple_values
            .into_iter()
            .map(|v| RawValue::Simple(v.into_view()))
            .chain(
                self.excluded_simple_values
                    .into_iter()
                    .map(|v| RawValue::Excluded(v.into_view())),
            )
            .chain(self.ranges.into_iter().map(range(false)))
            .chain(self.excluded_ranges.into_iter().map(range(true)))
            .chain(
                self.comparisons
                    .into_iter()
                    .map(|c| RawValue::Compare(c.operator, c.value.into_view())),
            )
            .chain(self.pattern_matchers.into_iter().map(|p| {
                RawValue::Pattern(PatternMatch {
                    kind: p.kind,
                    value: p.value,
                    case_insensitive: p.case_insensitive,
                    negated: p.negated,
                })
            }))
    }
}

/// Processes the JSON format, from text or an already decoded value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonInput;

impl JsonInput {
    /// Creates the processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Processes an already decoded structure (e.g. request body fields).
    #[must_use]
    pub fn process_value(&self, config: &ProcessorConfig, input: serde_json::Value) -> SearchCondition {
        Self::build(config, serde_json::from_value(input), false)
    }

    /// `located` tells whether serde errors carry a line and column, which
    /// only holds when decoding from text.
    fn build(
        config: &ProcessorConfig,
        decoded: Result<JsonGroup, serde_json::Error>,
        located: bool,
    ) -> SearchCondition {
        let mut builder = StructureBuilder::new(config);
        let mut root = ValuesGroup::new();

        match decoded {
            Ok(document) => {
                root.set_logical(document.logical_case);
                walk(&mut builder, document, &mut root, &GroupPath::root());
            }
            Err(error) => {
                let error = syntax_error(&error, located);
                tracing::debug!(code = error.kind.code(), %error, "malformed JSON input");
                builder.add_error(error.to_message());
                root.mark_errors();
            }
        }

        builder.finish(root)
    }
}

impl InputProcessor for JsonInput {
    fn process(&self, config: &ProcessorConfig, input: &str) -> SearchCondition {
        tracing::debug!(
            field_set = config.field_set().name(),
            length = input.len(),
            "processing JSON query"
        );
        if input.trim().is_empty() {
            return StructureBuilder::new(config).finish(ValuesGroup::new());
        }
        Self::build(config, serde_json::from_str(input), true)
    }
}

fn walk(builder: &mut StructureBuilder<'_>, json: JsonGroup, group: &mut ValuesGroup, at: &GroupPath) {
    for (name, bag) in json.fields {
        if builder.accept_field(group, at, &name) {
            for raw in bag.into_raw_values() {
                builder.add_value(group, at, &name, raw);
            }
        }
    }

    for child_json in json.groups {
        let Some(child_at) = builder.open_group(group, at) else {
            continue;
        };
        let child = group.add_group(ValuesGroup::with_logical(child_json.logical_case));
        walk(builder, child_json, child, &child_at);
    }
}

fn syntax_error(error: &serde_json::Error, located: bool) -> SyntaxError {
    let text = error.to_string();
    let reason = text
        .rsplit_once(" at line ")
        .map_or(text.as_str(), |(reason, _)| reason)
        .to_string();
    if located {
        SyntaxError::unexpected(SyntaxErrorKind::InvalidJson, error.line(), error.column(), reason)
    } else {
        SyntaxError::unlocated(SyntaxErrorKind::InvalidJson, reason)
    }
}
