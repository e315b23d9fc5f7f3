//! Input error reporting.
//!
//! A [`ConditionErrorMessage`] is data, not an `Err`: the processor collects
//! them and the caller decides how to render them. `message_template` and
//! `parameters` are the stable contract for translation layers; `message`
//! is the template rendered as-is.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One problem found in user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionErrorMessage {
    /// Dotted location, e.g. `groups[0].fields.id.ranges[1]`.
    pub path: String,
    /// Rendered message.
    pub message: String,
    /// Template with `{{ name }}` placeholders.
    pub message_template: String,
    /// Template parameters.
    pub parameters: BTreeMap<String, String>,
    /// Count used to pick a plural form, if any.
    pub pluralization_count: Option<u64>,
}

impl ConditionErrorMessage {
    /// Creates a message, rendering `template` with `parameters`.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        template: impl Into<String>,
        parameters: BTreeMap<String, String>,
    ) -> Self {
        let message_template = template.into();
        Self {
            path: path.into(),
            message: render_template(&message_template, &parameters),
            message_template,
            parameters,
            pluralization_count: None,
        }
    }

    /// Creates a message without parameters.
    #[must_use]
    pub fn simple(path: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(path, template, BTreeMap::new())
    }

    /// Sets the pluralization count.
    #[must_use]
    pub fn with_plural(mut self, count: u64) -> Self {
        self.pluralization_count = Some(count);
        self
    }
}

impl fmt::Display for ConditionErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Substitutes `{{ name }}` placeholders.
#[must_use]
pub fn render_template(template: &str, parameters: &BTreeMap<String, String>) -> String {
    parameters
        .iter()
        .fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{{ {name} }}}}"), value)
        })
}

/// Builds the parameter map for a message.
pub(crate) fn params<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
