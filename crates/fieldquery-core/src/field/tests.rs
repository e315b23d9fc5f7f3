//! Tests for field sets and the type registry.

use super::*;
use crate::sql::FunctionConversion;
use crate::value::{Decimal, Value};
use std::thread;

// ========== FieldSet ==========

#[test]
fn test_field_set_lookup() {
    // Arrange
    let field_set = FieldSet::builder("customers")
        .add_field("id", FieldType::integer())
        .add_field("name", FieldType::text())
        .build()
        .expect("field set");

    // Act & Assert
    assert_eq!(field_set.name(), "customers");
    assert_eq!(field_set.len(), 2);
    assert!(field_set.has("id"));
    assert!(field_set.find("email").is_none());
    assert_eq!(
        field_set.get("email").map(FieldConfig::name),
        Err(ConfigError::UnknownField {
            field: "email".into(),
            field_set: "customers".into(),
        })
    );
}

#[test]
fn test_field_set_keeps_declaration_order() {
    // Arrange
    let field_set = FieldSet::builder("s")
        .add_field("b", FieldType::text())
        .add_field("a", FieldType::text())
        .add_field("c", FieldType::text())
        .build()
        .expect("field set");

    // Act
    let names: Vec<&str> = field_set.iter().map(FieldConfig::name).collect();

    // Assert
    assert_eq!(names, ["b", "a", "c"]);
}

#[test]
fn test_field_set_rejects_duplicates() {
    // Arrange & Act
    let result = FieldSet::builder("customers")
        .add_field("id", FieldType::integer())
        .add_field("id", FieldType::text())
        .build();

    // Assert
    assert!(matches!(
        result,
        Err(ConfigError::DuplicateField { field, .. }) if field == "id"
    ));
}

#[test]
fn test_field_set_rejects_empty_name() {
    let result = FieldSet::builder("s").add_field("", FieldType::text()).build();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_field_options_follow_type() {
    // Arrange
    let field_set = FieldSet::builder("s")
        .add_field("id", FieldType::integer())
        .add_field("name", FieldType::text())
        .add_field("active", FieldType::boolean())
        .build()
        .expect("field set");

    // Act
    let id = field_set.get("id").expect("id").options();
    let name = field_set.get("name").expect("name").options();
    let active = field_set.get("active").expect("active").options();

    // Assert
    assert!(id.accept_ranges && id.accept_compares && !id.accept_pattern_match);
    assert!(!name.accept_ranges && name.accept_pattern_match);
    assert_eq!(active, FieldOptions::default());
}

#[test]
fn test_field_config_extras() {
    // Arrange
    let field = FieldConfig::new("email", Arc::new(FieldType::text()))
        .required()
        .with_conversion(Arc::new(FunctionConversion::new("LOWER")))
        .with_model_reference("Customer.email");

    // Act & Assert
    assert!(field.options().required);
    assert!(field.options().accept_pattern_match);
    assert_eq!(field.conversion().map(|c| c.name()), Some("function"));
    assert_eq!(field.model_reference(), Some("Customer.email"));
    assert_eq!(field.field_type().kind(), TypeKind::Text);
}

// ========== TypeRegistry ==========

#[test]
fn test_registry_builtin_types() {
    // Arrange
    let registry = TypeRegistry::with_builtin_types();

    // Act & Assert
    for name in ["integer", "decimal", "money", "date", "datetime", "text", "boolean"] {
        assert!(registry.contains(name), "{name}");
        assert_eq!(registry.get(name).expect(name).name(), name);
    }
    assert_eq!(
        registry.get("point").map(|t| t.name().to_string()),
        Err(ConfigError::UnknownType("point".into()))
    );
}

#[test]
fn test_registry_caches_resolved_type() {
    // Arrange
    let registry = TypeRegistry::with_builtin_types();

    // Act
    let first = registry.get("date").expect("date");
    let second = registry.get("date").expect("date");

    // Assert
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_registry_custom_factory_replaces_builtin() {
    // Arrange
    let registry = TypeRegistry::with_builtin_types();
    registry.register_factory("decimal", || FieldType::decimal(4));

    // Act
    let decimal = registry.get("decimal").expect("decimal");

    // Assert
    assert_eq!(
        decimal.transformer().reverse_transform("1.2345"),
        Ok(Value::Decimal(Decimal::new(12_345, 4)))
    );
}

#[test]
fn test_registry_builds_field_set() {
    // Arrange
    let registry = TypeRegistry::with_builtin_types();

    // Act
    let field_set = FieldSet::builder("s")
        .add_registered(&registry, "born", "date")
        .and_then(|b| b.add_registered(&registry, "geo", "point"));

    // Assert
    assert!(matches!(field_set, Err(ConfigError::UnknownType(t)) if t == "point"));
}

#[test]
fn test_registry_concurrent_resolution() {
    // Arrange
    let registry = Arc::new(TypeRegistry::with_builtin_types());

    // Act
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get("money").expect("money"))
        })
        .collect();
    let resolved: Vec<Arc<FieldType>> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();

    // Assert
    assert!(resolved.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_registry_factory_may_look_up_other_types() {
    // Arrange
    let registry = Arc::new(TypeRegistry::with_builtin_types());
    let lookup = Arc::downgrade(&registry);
    registry.register_factory("price", move || {
        let known = lookup
            .upgrade()
            .is_some_and(|r| r.contains("decimal") && r.get("decimal").is_ok());
        FieldType::decimal(if known { 4 } else { 0 })
    });

    // Act
    let price = registry.get("price").expect("price");

    // Assert
    assert_eq!(
        price.transformer().reverse_transform("1.2345"),
        Ok(Value::Decimal(Decimal::new(12_345, 4)))
    );
    assert!(Arc::ptr_eq(&price, &registry.get("price").expect("price")));
}

#[test]
fn test_registry_lookups_while_registering() {
    // Arrange
    let registry = Arc::new(TypeRegistry::with_builtin_types());

    // Act
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..200).all(|_| registry.contains("text") && registry.get("text").is_ok())
            })
        })
        .collect();
    for round in 0..200 {
        registry.register_factory(format!("custom_{round}"), FieldType::text);
        registry.register_factory("text", FieldType::text);
    }

    // Assert
    assert!(readers.into_iter().all(|h| h.join().expect("thread")));
    assert!(registry.contains("custom_199"));
}
