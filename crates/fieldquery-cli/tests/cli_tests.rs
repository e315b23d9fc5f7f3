//! CLI Integration Tests
//!
//! Tests for `fieldquery` CLI commands using `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ORDERS_CONFIG: &str = r#"
[processor]
max_nesting_level = 2

[fieldset]
name = "orders"

[[fieldset.fields]]
name = "id"
type = "integer"
column = "o.id"

[[fieldset.fields]]
name = "name"
type = "text"
column = "c.name"

[[fieldset.fields]]
name = "total"
type = "decimal"
scale = 2
column = "o.total"
quoted = true

[[fieldset.fields]]
name = "age"
type = "integer"
column = "c.birth_date"
conversion = { kind = "age" }
"#;

/// Get the CLI binary command
#[allow(deprecated)]
fn fieldquery_cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fieldquery").unwrap();
    cmd.arg("--no-color").arg("--config").arg(config);
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("fieldquery.toml");
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Help & Configuration Tests
// =============================================================================

#[test]
fn test_help_displays_usage() {
    #[allow(deprecated)]
    Command::cargo_bin("fieldquery")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fieldquery CLI"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_check_config_lists_fields() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Field set 'orders' with 4 field(s), platform postgres"))
        .stdout(predicate::str::contains("o.total (quoted)"))
        .stdout(predicate::str::contains("age"));
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    fieldquery_cmd(&temp_dir.path().join("missing.toml"))
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        &temp_dir,
        "[[fieldset.fields]]\nname = \"name\"\ntype = \"text\"\nscale = 2\n",
    );

    fieldquery_cmd(&config)
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"))
        .stderr(predicate::str::contains("fieldset.fields[0].scale"));
}

#[test]
fn test_env_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .env("FIELDQUERY_SQL__PLATFORM", "sqlite")
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("platform sqlite"));
}

// =============================================================================
// Parse Command Tests
// =============================================================================

#[test]
fn test_parse_valid_query() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["parse", "id: 01, 2; name: !\"john\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Query is valid"))
        .stdout(predicate::str::contains("id: 1, 2; name: !john"));
}

#[test]
fn test_parse_with_optimizer() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["parse", "--optimize", "id: 6..10, 1..5, 3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id: 1..10"));
}

#[test]
fn test_parse_invalid_query_reports_paths() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["parse", "email: x; (((id: 1)))"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("fields.email"))
        .stdout(predicate::str::contains("Group nesting level of 2 is exceeded."))
        .stderr(predicate::str::contains("Query is invalid (2 error(s))"));
}

#[test]
fn test_parse_syntax_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["parse", "id 1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("(root)"))
        .stdout(predicate::str::contains("Line 1, Column 4"));
}

#[test]
fn test_parse_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    let output = fieldquery_cmd(&config)
        .args(["parse", "--format", "json", "id: 1, 1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["warnings"][0]["path"], "fields.id.simple-values[1]");
    assert_eq!(
        report["condition"]["fields"]["id"]["simple-values"],
        serde_json::json!(["1"])
    );
}

// =============================================================================
// SQL Command Tests
// =============================================================================

#[test]
fn test_sql_uses_column_mappings() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["sql", "id: 1, 2; name: !\"john\"; total: >=10"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"(o.id IN (:id_1, :id_2)) AND (c.name <> :name_1) AND ("o"."total" >= :total_1)"#,
        ))
        .stdout(predicate::str::contains(":name_1"))
        .stdout(predicate::str::contains("john"));
}

#[test]
fn test_sql_platform_override() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["sql", "--platform", "mysql", "total: 5; age: >=18"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(`o`.`total` = :total_1) AND (TIMESTAMPDIFF(YEAR, c.birth_date, CURDATE()) >= :age_1)",
        ));
}

#[test]
fn test_sql_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    let output = fieldquery_cmd(&config)
        .args(["sql", "--format", "json", "id: 1..5, 6..9"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let clause: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(clause["sql"], "o.id >= :id_1 AND o.id <= :id_2");
    assert_eq!(clause["parameters"][1]["name"], "id_2");
}

#[test]
fn test_sql_reads_query_from_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["sql", "--input", "json", "-"])
        .write_stdin(r#"{"fields": {"id": {"excluded-simple-values": [3]}}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("o.id <> :id_1"));
}

#[test]
fn test_sql_unsupported_conversion_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["sql", "--platform", "dql", "age: 30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SQL generation failed"))
        .stderr(predicate::str::contains("FQ-022"));
}

#[test]
fn test_sql_empty_query() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args(["sql", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conditions."));
}

// =============================================================================
// Export Command Tests
// =============================================================================

#[test]
fn test_export_json_to_string() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    fieldquery_cmd(&config)
        .args([
            "export",
            "--input",
            "json",
            r#"{"logical-case": "OR", "fields": {"total": {"ranges": [{"lower": 1, "upper": "2.5", "inclusive-upper": false}]}}}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("*total: 1.00..2.50["));
}

#[test]
fn test_export_string_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, ORDERS_CONFIG);

    let output = fieldquery_cmd(&config)
        .args(["export", "--to", "json", "name: ~i*smith"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let exported: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(exported["fields"]["name"]["pattern-matchers"][0]["type"], "CONTAINS");
    assert_eq!(exported["fields"]["name"]["pattern-matchers"][0]["case-insensitive"], true);
}
