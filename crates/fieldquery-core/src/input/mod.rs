//! Input processors: user input in, [`SearchCondition`] out.
//!
//! Processors never fail with `Err` on bad input. Syntax and validation
//! problems are collected on the returned condition; check
//! [`SearchCondition::is_valid`] before generating queries.
//!
//! # Example
//!
//! ```ignore
//! use fieldquery_core::input::{InputProcessor, ProcessorConfig, StringQueryInput};
//!
//! let config = ProcessorConfig::new(field_set);
//! let condition = StringQueryInput::new().process(&config, "id: 1, 2; name: !\"john\"");
//! assert!(condition.is_valid());
//! ```

mod json;
mod string_query;
mod structure;
mod syntax_error;

pub use json::JsonInput;
pub use string_query::StringQueryInput;
pub use syntax_error::{SyntaxError, SyntaxErrorKind};

pub(crate) use string_query::is_bare_literal;

use std::sync::Arc;

use crate::condition::SearchCondition;
use crate::config::ProcessorLimits;
use crate::field::FieldSet;

/// Default maximum depth of nested groups (root is level 0).
pub const DEFAULT_MAX_NESTING_LEVEL: usize = 5;
/// Default maximum number of values per field per group.
pub const DEFAULT_MAX_VALUES: usize = 100;
/// Default maximum number of subgroups per group.
pub const DEFAULT_MAX_GROUPS: usize = 100;

/// Field set and structural limits for one processing run.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    field_set: Arc<FieldSet>,
    max_nesting_level: usize,
    max_values: usize,
    max_groups: usize,
}

impl ProcessorConfig {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        Self {
            field_set,
            max_nesting_level: DEFAULT_MAX_NESTING_LEVEL,
            max_values: DEFAULT_MAX_VALUES,
            max_groups: DEFAULT_MAX_GROUPS,
        }
    }

    /// Applies limits loaded from configuration.
    #[must_use]
    pub fn with_limits(mut self, limits: &ProcessorLimits) -> Self {
        self.max_nesting_level = limits.max_nesting_level;
        self.max_values = limits.max_values;
        self.max_groups = limits.max_groups;
        self
    }

    /// Sets the maximum nesting level.
    #[must_use]
    pub fn with_max_nesting_level(mut self, level: usize) -> Self {
        self.max_nesting_level = level;
        self
    }

    /// Sets the maximum number of values per field per group.
    #[must_use]
    pub fn with_max_values(mut self, max: usize) -> Self {
        self.max_values = max;
        self
    }

    /// Sets the maximum number of subgroups per group.
    #[must_use]
    pub fn with_max_groups(mut self, max: usize) -> Self {
        self.max_groups = max;
        self
    }

    /// Field set input is validated against.
    #[must_use]
    pub fn field_set(&self) -> &Arc<FieldSet> {
        &self.field_set
    }

    /// Maximum nesting level.
    #[must_use]
    pub fn max_nesting_level(&self) -> usize {
        self.max_nesting_level
    }

    /// Maximum number of values per field per group.
    #[must_use]
    pub fn max_values(&self) -> usize {
        self.max_values
    }

    /// Maximum number of subgroups per group.
    #[must_use]
    pub fn max_groups(&self) -> usize {
        self.max_groups
    }
}

/// Turns one input format into a [`SearchCondition`].
pub trait InputProcessor {
    /// Parses and validates `input`.
    ///
    /// Always returns a condition; problems are reported through
    /// [`SearchCondition::errors`].
    fn process(&self, config: &ProcessorConfig, input: &str) -> SearchCondition;
}
