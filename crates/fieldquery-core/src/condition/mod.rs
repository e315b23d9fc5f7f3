//! The search condition model.
//!
//! ```text
//! SearchCondition
//!   ├── FieldSet (shared, read-only)
//!   ├── primary condition (optional ValuesGroup, ANDed at generation)
//!   └── root ValuesGroup
//!         ├── fields: name -> ValuesBag
//!         └── groups: [ValuesGroup, ...]
//! ```
//!
//! Trees are mutable while an input processor or the builder fills them.
//! Once wrapped in a [`SearchCondition`] they can only be read, or taken
//! apart by value and rebuilt (which is what the optimizer does).

mod bag;
mod builder;
mod error;
mod group;
mod values;

pub use bag::ValuesBag;
pub use builder::{GroupBuilder, SearchConditionBuilder, ValuesBagBuilder};
pub use error::{render_template, ConditionErrorMessage};
pub(crate) use error::params;
pub use group::{Logical, ValuesGroup};
pub(crate) use values::ValueKind;
pub use values::{Compare, CompareOp, PatternKind, PatternMatch, Range, SingleValue};

use std::sync::Arc;

use crate::field::FieldSet;

/// A field set plus a validated (or error-marked) condition tree.
#[derive(Debug, Clone)]
pub struct SearchCondition {
    field_set: Arc<FieldSet>,
    root: ValuesGroup,
    primary: Option<ValuesGroup>,
    errors: Vec<ConditionErrorMessage>,
    warnings: Vec<ConditionErrorMessage>,
}

impl SearchCondition {
    /// Wraps an error-free tree.
    #[must_use]
    pub fn new(field_set: Arc<FieldSet>, root: ValuesGroup) -> Self {
        Self {
            field_set,
            root,
            primary: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Wraps a tree together with the problems found while building it.
    #[must_use]
    pub fn with_messages(
        field_set: Arc<FieldSet>,
        root: ValuesGroup,
        errors: Vec<ConditionErrorMessage>,
        warnings: Vec<ConditionErrorMessage>,
    ) -> Self {
        Self {
            field_set,
            root,
            primary: None,
            errors,
            warnings,
        }
    }

    /// Attaches a primary condition, ANDed with the user condition when
    /// generating queries (e.g. tenant scoping).
    #[must_use]
    pub fn with_primary_condition(mut self, primary: ValuesGroup) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Field set the condition was built against.
    #[must_use]
    pub fn field_set(&self) -> &Arc<FieldSet> {
        &self.field_set
    }

    /// Root group of the user condition.
    #[must_use]
    pub fn values_group(&self) -> &ValuesGroup {
        &self.root
    }

    /// Primary condition, if any.
    #[must_use]
    pub fn primary_condition(&self) -> Option<&ValuesGroup> {
        self.primary.as_ref()
    }

    /// Returns `true` when the user condition holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns `true` when no errors were reported.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when errors were reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[ConditionErrorMessage] {
        &self.errors
    }

    /// Non-fatal notices such as ignored duplicates.
    #[must_use]
    pub fn warnings(&self) -> &[ConditionErrorMessage] {
        &self.warnings
    }

    pub(crate) fn into_parts(self) -> ConditionParts {
        ConditionParts {
            field_set: self.field_set,
            root: self.root,
            primary: self.primary,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    pub(crate) fn from_parts(parts: ConditionParts) -> Self {
        Self {
            field_set: parts.field_set,
            root: parts.root,
            primary: parts.primary,
            errors: parts.errors,
            warnings: parts.warnings,
        }
    }
}

/// Owned pieces of a [`SearchCondition`], for rebuilding it.
pub(crate) struct ConditionParts {
    pub field_set: Arc<FieldSet>,
    pub root: ValuesGroup,
    pub primary: Option<ValuesGroup>,
    pub errors: Vec<ConditionErrorMessage>,
    pub warnings: Vec<ConditionErrorMessage>,
}
