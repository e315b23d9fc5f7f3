//! Tests for `error` module

use super::error::*;

// -------------------------------------------------------------------------
// Error code tests
// -------------------------------------------------------------------------

fn all_errors() -> Vec<Error> {
    vec![
        ConfigError::UnknownField {
            field: "id".into(),
            field_set: "customers".into(),
        }
        .into(),
        ConfigError::DuplicateField {
            field: "id".into(),
            field_set: "customers".into(),
        }
        .into(),
        ConfigError::UnknownType("point".into()).into(),
        ConfigError::InvalidValue {
            key: "sql.platform".into(),
            message: "test".into(),
        }
        .into(),
        ConfigError::Parse("test".into()).into(),
        ConfigError::InvalidFieldValue {
            field: "id".into(),
            message: "test".into(),
        }
        .into(),
        ConfigError::UnsupportedValueKind {
            field: "code".into(),
            kind: "ranges".into(),
        }
        .into(),
        ConfigError::InvalidRange {
            field: "id".into(),
            message: "test".into(),
        }
        .into(),
        GenerateError::UnmappedField("id".into()).into(),
        GenerateError::InvalidCondition(2).into(),
        GenerateError::UnsupportedConversion {
            field: "age".into(),
            conversion: "age".into(),
            platform: "dql".into(),
        }
        .into(),
        Error::Io(std::io::Error::other("test")),
        Error::Serialization("test".into()),
    ]
}

#[test]
fn test_error_codes_are_unique() {
    // Arrange
    let errors = all_errors();

    // Act
    let codes: Vec<&str> = errors.iter().map(Error::code).collect();

    // Assert
    let mut unique_codes = codes.clone();
    unique_codes.sort_unstable();
    unique_codes.dedup();
    assert_eq!(codes.len(), unique_codes.len(), "codes: {codes:?}");
    assert!(codes.iter().all(|code| code.starts_with("FQ-")));
}

#[test]
fn test_error_messages_carry_their_code() {
    // Arrange
    let errors = all_errors();

    // Act & Assert
    for error in &errors {
        let message = error.to_string();
        assert!(
            message.starts_with(&format!("[{}]", error.code())),
            "message without code: {message}"
        );
    }
}

#[test]
fn test_unsupported_conversion_message() {
    // Arrange
    let error = GenerateError::UnsupportedConversion {
        field: "age".into(),
        conversion: "age".into(),
        platform: "dql".into(),
    };

    // Act
    let message = error.to_string();

    // Assert
    assert_eq!(
        message,
        "[FQ-022] Conversion 'age' for field 'age' is not supported on platform 'dql'"
    );
}

#[test]
fn test_serde_json_error_converts_to_serialization() {
    // Arrange
    let json_error = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid JSON");

    // Act
    let error: Error = json_error.into();

    // Assert
    assert_eq!(error.code(), "FQ-091");
}
