//! Condition tree nodes.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::bag::ValuesBag;

/// Logical connector of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logical {
    /// All fields and subgroups must match.
    #[default]
    And,
    /// At least one field or subgroup must match.
    Or,
}

impl Logical {
    /// SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the condition tree: per-field bags plus nested groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuesGroup {
    logical: Logical,
    fields: IndexMap<String, ValuesBag>,
    groups: Vec<ValuesGroup>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    has_errors: bool,
}

impl ValuesGroup {
    /// Creates an empty AND group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty group with the given connector.
    #[must_use]
    pub fn with_logical(logical: Logical) -> Self {
        Self {
            logical,
            ..Self::default()
        }
    }

    /// Connector.
    #[must_use]
    pub fn logical(&self) -> Logical {
        self.logical
    }

    /// Sets the connector.
    pub fn set_logical(&mut self, logical: Logical) {
        self.logical = logical;
    }

    /// Field bags in insertion order.
    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, ValuesBag> {
        &self.fields
    }

    /// Bag of `name`, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ValuesBag> {
        self.fields.get(name)
    }

    /// Returns `true` if `name` has a bag in this group.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Bag of `name`, created on first use.
    pub fn field_mut(&mut self, name: &str) -> &mut ValuesBag {
        self.fields.entry(name.to_string()).or_default()
    }

    /// Sets (replaces) the bag of `name`.
    pub fn add_field(&mut self, name: impl Into<String>, bag: ValuesBag) {
        self.fields.insert(name.into(), bag);
    }

    /// Removes and returns the bag of `name`.
    pub fn remove_field(&mut self, name: &str) -> Option<ValuesBag> {
        self.fields.shift_remove(name)
    }

    /// Nested groups.
    #[must_use]
    pub fn groups(&self) -> &[ValuesGroup] {
        &self.groups
    }

    /// Appends a nested group and returns it for filling.
    pub fn add_group(&mut self, group: ValuesGroup) -> &mut ValuesGroup {
        self.groups.push(group);
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    pub(crate) fn fields_mut(&mut self) -> &mut IndexMap<String, ValuesBag> {
        &mut self.fields
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<ValuesGroup> {
        &mut self.groups
    }

    /// Returns `true` if an error was reported for this group or its values.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Flags the group as erroneous.
    pub fn mark_errors(&mut self) {
        self.has_errors = true;
    }

    /// Returns `true` when this group and all subgroups hold no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(ValuesBag::is_empty) && self.groups.iter().all(Self::is_empty)
    }

    /// Number of values in this group and all subgroups.
    #[must_use]
    pub fn count_values(&self) -> usize {
        self.fields.values().map(ValuesBag::count).sum::<usize>()
            + self.groups.iter().map(Self::count_values).sum::<usize>()
    }

    /// Visits every field name used in this group and its subgroups.
    pub fn for_each_field<'a>(&'a self, f: &mut dyn FnMut(&'a str, &'a ValuesBag)) {
        for (name, bag) in &self.fields {
            f(name, bag);
        }
        for group in &self.groups {
            group.for_each_field(f);
        }
    }
}
