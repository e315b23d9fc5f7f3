//! Table rendering for command output.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use fieldquery_core::{
    BoundParameter, ConditionErrorMessage, ConversionDefinition, FieldQueryConfig, FieldSet,
};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect::<Vec<_>>());
    table
}

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "-"
    }
}

/// Errors or warnings, one row per message.
pub fn messages_table(messages: &[ConditionErrorMessage]) -> Table {
    let mut table = table(&["path", "message"]);
    for message in messages {
        let path = if message.path.is_empty() {
            "(root)"
        } else {
            message.path.as_str()
        };
        table.add_row(vec![Cell::new(path), Cell::new(&message.message)]);
    }
    table
}

/// Bound parameters with their values.
pub fn parameters_table(parameters: &[BoundParameter]) -> Table {
    let mut table = table(&["parameter", "value"]);
    for parameter in parameters {
        table.add_row(vec![
            Cell::new(format!(":{}", parameter.name)),
            Cell::new(parameter.value.to_string()),
        ]);
    }
    table
}

fn conversion_label(conversion: Option<&ConversionDefinition>) -> String {
    match conversion {
        None => "-".to_string(),
        Some(ConversionDefinition::Cast { db_type }) => format!("CAST AS {db_type}"),
        Some(ConversionDefinition::Function { name }) => format!("{name}()"),
        Some(ConversionDefinition::Age) => "age".to_string(),
    }
}

/// Configured fields with their effective capabilities.
pub fn fields_table(config: &FieldQueryConfig, field_set: &FieldSet) -> Table {
    let mut table = table(&[
        "field", "type", "column", "ranges", "compares", "patterns", "required", "conversion",
    ]);
    for definition in &config.fieldset.fields {
        let Some(field) = field_set.find(&definition.name) else {
            continue;
        };
        let options = field.options();
        let column = if definition.quoted {
            format!("{} (quoted)", definition.column())
        } else {
            definition.column().to_string()
        };
        table.add_row(vec![
            Cell::new(field.name()),
            Cell::new(field.field_type().name()),
            Cell::new(column),
            Cell::new(flag(options.accept_ranges)),
            Cell::new(flag(options.accept_compares)),
            Cell::new(flag(options.accept_pattern_match)),
            Cell::new(flag(options.required)),
            Cell::new(conversion_label(definition.conversion.as_ref())),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldquery_core::{TypeRegistry, Value};

    #[test]
    fn test_messages_table_marks_root_path() {
        let messages = vec![ConditionErrorMessage::simple("", "Broken.")];
        let rendered = messages_table(&messages).to_string();
        assert!(rendered.contains("(root)"));
        assert!(rendered.contains("Broken."));
    }

    #[test]
    fn test_parameters_table_prefixes_colon() {
        let parameters = vec![BoundParameter {
            name: "id_1".to_string(),
            value: Value::Integer(7),
        }];
        let rendered = parameters_table(&parameters).to_string();
        assert!(rendered.contains(":id_1"));
        assert!(rendered.contains('7'));
    }

    #[test]
    fn test_fields_table_lists_conversions() {
        let config = FieldQueryConfig::from_toml(
            r#"
            [[fieldset.fields]]
            name = "born"
            type = "date"
            column = "birth_date"
            quoted = true
            conversion = { kind = "cast", db_type = "DATE" }
            "#,
        )
        .expect("config");
        let field_set = config
            .build_field_set(&TypeRegistry::with_builtin_types())
            .expect("field set");

        let rendered = fields_table(&config, &field_set).to_string();

        assert!(rendered.contains("birth_date (quoted)"));
        assert!(rendered.contains("CAST AS DATE"));
    }
}
