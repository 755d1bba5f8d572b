//! CLI integration tests for custodian-migrate.
//!
//! These tests verify argument parsing, help output, exit codes and the
//! database-free `plan` and `show` commands against a temporary metadata
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Get a command for the custodian-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("custodian-migrate").unwrap()
}

const ORDER: &str = r#"{
  "name": "order",
  "key": "id",
  "fields": [
    {"name": "id", "type": "number", "default": {"func": "nextval"}},
    {"name": "state", "type": "enum", "enum": ["new", "paid"]}
  ]
}"#;

/// Temporary workspace with a config file and an `order` description.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let meta = dir.path().join("meta");
    std::fs::create_dir(&meta).unwrap();
    std::fs::write(meta.join("order.json"), ORDER).unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        format!(
            "target:\n  host: localhost\n  database: app\n  user: postgres\n  password: secret\n  ssl_mode: disable\nmetadata:\n  path: {}\n",
            meta.display()
        ),
    )
    .unwrap();
    dir
}

fn write_migration(dir: &Path, yaml: &str) -> String {
    let path = dir.join("migration.yaml");
    std::fs::write(&path, yaml).unwrap();
    path.to_str().unwrap().to_string()
}

fn config_arg(dir: &Path) -> String {
    dir.join("config.yaml").to_str().unwrap().to_string()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_apply_subcommand_help() {
    cmd()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--migration"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("custodian-migrate"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flags_exist() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"))
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Exit Code Tests - Config Errors
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_required_fields_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "target:").unwrap();
    writeln!(file, "  host: localhost").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

// =============================================================================
// Plan and Show
// =============================================================================

#[test]
fn test_plan_add_field() {
    let dir = workspace();
    let migration = write_migration(
        dir.path(),
        "object: order\noperation:\n  type: addField\n  field:\n    name: title\n    type: string\n    optional: true\n",
    );

    cmd()
        .args(["-c", &config_arg(dir.path()), "plan", "--migration", &migration])
        .assert()
        .success()
        .stderr(predicate::str::contains("Using file metadata store"))
        .stdout(predicate::str::contains("-- add_column#o_order"))
        .stdout(predicate::str::contains(
            "ALTER TABLE \"o_order\" ADD COLUMN \"title\" text;",
        ));

    // planning never writes the description
    let stored = std::fs::read_to_string(dir.path().join("meta/order.json")).unwrap();
    assert!(!stored.contains("title"));
}

#[test]
fn test_plan_enum_extension_as_json() {
    let dir = workspace();
    let migration = write_migration(
        dir.path(),
        "object: order\noperation:\n  type: updateField\n  name: state\n  field:\n    name: state\n    type: enum\n    enum: [new, paid, shipped]\n",
    );

    cmd()
        .args([
            "-c",
            &config_arg(dir.path()),
            "--output-json",
            "plan",
            "--migration",
            &migration,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("add_enum_value#o_order_state"))
        .stdout(predicate::str::contains("ADD VALUE IF NOT EXISTS 'shipped'"));
}

#[test]
fn test_plan_enum_removal_exits_with_code_2() {
    let dir = workspace();
    let migration = write_migration(
        dir.path(),
        "object: order\noperation:\n  type: updateField\n  name: state\n  field:\n    name: state\n    type: enum\n    enum: [paid]\n",
    );

    cmd()
        .args(["-c", &config_arg(dir.path()), "plan", "--migration", &migration])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Necessary minimum"));
}

#[test]
fn test_plan_duplicate_field_exits_with_code_2() {
    let dir = workspace();
    let migration = write_migration(
        dir.path(),
        "object: order\noperation:\n  type: addField\n  field:\n    name: state\n    type: string\n",
    );

    cmd()
        .args(["-c", &config_arg(dir.path()), "plan", "--migration", &migration])
        .assert()
        .code(2);
}

#[test]
fn test_plan_unresolved_link_exits_with_code_3() {
    let dir = workspace();
    let migration = write_migration(
        dir.path(),
        "object: order\noperation:\n  type: addField\n  field:\n    name: client\n    type: object\n    linkType: inner\n    linkMeta: client\n",
    );

    cmd()
        .args(["-c", &config_arg(dir.path()), "plan", "--migration", &migration])
        .assert()
        .code(3);
}

#[test]
fn test_plan_unknown_object_exits_with_code_6() {
    let dir = workspace();
    let migration = write_migration(
        dir.path(),
        "object: invoice\noperation:\n  type: removeField\n  name: id\n",
    );

    cmd()
        .args(["-c", &config_arg(dir.path()), "plan", "--migration", &migration])
        .assert()
        .code(6);
}

#[test]
fn test_show_prints_description() {
    let dir = workspace();

    cmd()
        .args(["-c", &config_arg(dir.path()), "show", "order"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"order\""))
        .stdout(predicate::str::contains("\"nextval\""));
}
