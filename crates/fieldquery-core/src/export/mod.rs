//! Condition exporters.
//!
//! Exporters write the user condition (not the primary condition) back into
//! an input format. Values are rendered through the field's transformer, so
//! the output parses back into an equal condition.

mod json;
mod string;

pub use json::JsonExporter;
pub use string::StringExporter;

use crate::condition::{SearchCondition, SingleValue};
use crate::field::FieldSet;

/// Serializes a condition into an input format.
pub trait ConditionExporter {
    /// Exports the user condition of `condition`.
    fn export(&self, condition: &SearchCondition) -> String;
}

/// Canonical view of `value`, falling back to the stored view for fields
/// missing from the set.
pub(crate) fn canonical_view(field_set: &FieldSet, field: &str, value: &SingleValue) -> String {
    field_set.find(field).map_or_else(
        || value.view.clone(),
        |config| config.field_type().transformer().transform(&value.value),
    )
}
