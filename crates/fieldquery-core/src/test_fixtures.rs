//! Shared fixtures for unit tests.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::condition::SearchCondition;
use crate::field::{FieldConfig, FieldOptions, FieldSet, FieldType};
use crate::input::{InputProcessor, ProcessorConfig, StringQueryInput};

/// Customer field set used across tests:
///
/// | field      | type                  | extras                     |
/// |------------|-----------------------|----------------------------|
/// | `id`       | integer               |                            |
/// | `name`     | text                  |                            |
/// | `birthday` | date                  |                            |
/// | `created`  | datetime              |                            |
/// | `price`    | decimal(2)            |                            |
/// | `balance`  | money (EUR default)   |                            |
/// | `active`   | boolean               |                            |
/// | `status`   | choice                | active -> 1, blocked -> 2  |
/// | `code`     | integer               | no ranges, no comparisons  |
pub(crate) fn customer_field_set() -> Arc<FieldSet> {
    let mut choices = IndexMap::new();
    choices.insert("active".to_string(), "1".to_string());
    choices.insert("blocked".to_string(), "2".to_string());

    let code = FieldConfig::new("code", Arc::new(FieldType::integer()))
        .with_options(FieldOptions::default());

    let field_set = FieldSet::builder("customers")
        .add_field("id", FieldType::integer())
        .add_field("name", FieldType::text())
        .add_field("birthday", FieldType::date())
        .add_field("created", FieldType::datetime())
        .add_field("price", FieldType::decimal(2))
        .add_field("balance", FieldType::money(Some("EUR".to_string())))
        .add_field("active", FieldType::boolean())
        .add_field("status", FieldType::choice(choices))
        .add(code)
        .build()
        .expect("customer field set");
    Arc::new(field_set)
}

/// Processes `input` with the string processor and default limits.
pub(crate) fn parse(input: &str) -> SearchCondition {
    let config = ProcessorConfig::new(customer_field_set());
    StringQueryInput::new().process(&config, input)
}

/// Processes `input` and fails the test on any error.
pub(crate) fn parse_valid(input: &str) -> SearchCondition {
    let condition = parse(input);
    assert!(
        condition.is_valid(),
        "unexpected errors for {input:?}: {:?}",
        condition.errors()
    );
    condition
}
