// Integration tests for the strata CLI against a scratch config file.
//
// These enforce the shell contract: data on stdout, diagnostics on
// stderr, exit codes per the registry in src/exit_codes.rs, and stdout
// of --json commands being exactly one JSON value.
//
// Run with: cargo test -p strata-cli --test config_cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn scratch_config() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    (dir, path)
}

fn strata(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_strata"));
    cmd.arg("--config").arg(config);
    cmd
}

fn run(config: &Path, args: &[&str]) -> Output {
    strata(config).args(args).output().expect("strata should run")
}

fn run_ok(config: &Path, args: &[&str]) -> String {
    let output = run(config, args);
    assert!(
        output.status.success(),
        "expected success for {:?}\nstatus: {:?}\nstderr: {}",
        args,
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Assert stdout is exactly one parseable JSON value (no banners, no
/// extra lines; serde_json rejects trailing content).
fn assert_single_json(stdout: &str) -> Value {
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed)
    })
}

// ===========================================================================
// set / get round trips
// ===========================================================================

#[test]
fn set_int_then_get_json() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "foo.bar", "42", "--int"]);
    let stdout = run_ok(&config, &["get", "foo.bar", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(42));
}

#[test]
fn set_without_flags_stores_text() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "server.host", "42"]);
    let stdout = run_ok(&config, &["get", "server.host", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!("42"));
}

#[test]
fn set_bool_coerces_one_to_true() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "webcam.flipH", "1", "--bool"]);
    let stdout = run_ok(&config, &["get", "webcam.flipH", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(true));
}

#[test]
fn set_float_coerces() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "motion.speed", "2.5", "--float"]);
    let stdout = run_ok(&config, &["get", "motion.speed", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(2.5));
}

#[test]
fn set_json_stores_structure() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "server", r#"{"host": "::", "port": 5000}"#, "--json"]);
    let stdout = run_ok(&config, &["get", "server.port", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(5000));
}

#[test]
fn path_is_normalized_before_use() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", " a . b..c ", "1", "--int"]);
    let stdout = run_ok(&config, &["get", "a.b.c", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(1));
}

#[test]
fn get_unset_path_prints_null() {
    let (_dir, config) = scratch_config();
    let stdout = run_ok(&config, &["get", "never.set", "--json"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn get_default_output_is_pretty() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "server", r#"{"host": "::", "port": 5000}"#, "--json"]);
    let stdout = run_ok(&config, &["get", "server"]);
    // Pretty-printed: multi-line with indentation
    assert!(stdout.contains("{\n"), "expected pretty output, got: {}", stdout);
    assert!(stdout.contains("  \"host\""), "expected indented keys, got: {}", stdout);
}

#[test]
fn get_yaml_is_block_style() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "api.keys", "abc"]);
    run_ok(&config, &["append_value", "api.keys", "def"]);
    let stdout = run_ok(&config, &["get", "api.keys", "--yaml"]);
    assert_eq!(stdout, "- abc\n- def\n");
}

#[test]
fn get_raw_prints_string_verbatim() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "server.host", "with \"quotes\" inside"]);
    let stdout = run_ok(&config, &["get", "server.host", "--raw"]);
    assert_eq!(stdout, "with \"quotes\" inside\n");
}

#[test]
fn get_raw_on_non_string_is_type_mismatch() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "server.port", "5000", "--int"]);
    let output = run(&config, &["get", "server.port", "--raw"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a string"), "stderr: {}", stderr);
}

// ===========================================================================
// coercion failures
// ===========================================================================

#[test]
fn bad_int_coercion_fails_without_creating_file() {
    let (_dir, config) = scratch_config();
    let output = run(&config, &["set", "foo", "abc", "--int"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(!config.exists(), "failed set must not persist anything");
}

#[test]
fn bad_bool_coercion_leaves_store_unchanged() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "flag", "true", "--bool"]);
    let before = std::fs::read_to_string(&config).unwrap();

    let output = run(&config, &["set", "flag", "maybe", "--bool"]);
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), before);
}

#[test]
fn invalid_json_value_is_parse_error() {
    let (_dir, config) = scratch_config();
    let output = run(&config, &["set", "foo", "{not json", "--json"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid JSON value"), "stderr: {}", stderr);
    assert!(!config.exists());
}

#[test]
fn coercion_flags_are_mutually_exclusive() {
    let (_dir, config) = scratch_config();
    let output = run(&config, &["set", "foo", "1", "--bool", "--int"]);
    assert_eq!(output.status.code(), Some(2), "clap usage error");
}

// ===========================================================================
// remove
// ===========================================================================

#[test]
fn remove_then_get_prints_null() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "foo.bar", "42", "--int"]);
    run_ok(&config, &["remove", "foo.bar"]);
    let stdout = run_ok(&config, &["get", "foo.bar", "--json"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn remove_never_set_path_succeeds() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["remove", "never.set"]);
}

// ===========================================================================
// list operations
// ===========================================================================

#[test]
fn append_on_unset_path_creates_list() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "list.x", "hello"]);
    let stdout = run_ok(&config, &["get", "list.x", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(["hello"]));
}

#[test]
fn append_preserves_order() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "xs", "v1"]);
    run_ok(&config, &["append_value", "xs", "v2"]);
    let stdout = run_ok(&config, &["get", "xs", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(["v1", "v2"]));
}

#[test]
fn append_json_value() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "printers", r#"{"name": "left"}"#, "--json"]);
    let stdout = run_ok(&config, &["get", "printers", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!([{"name": "left"}]));
}

#[test]
fn append_to_non_list_is_type_mismatch() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["set", "name", "hello"]);
    let before = std::fs::read_to_string(&config).unwrap();

    let output = run(&config, &["append_value", "name", "x"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a list"), "stderr: {}", stderr);
    assert_eq!(std::fs::read_to_string(&config).unwrap(), before);
}

#[test]
fn insert_at_index_shifts_elements() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "xs", "a"]);
    run_ok(&config, &["append_value", "xs", "c"]);
    run_ok(&config, &["insert_value", "xs", "1", "b"]);
    let stdout = run_ok(&config, &["get", "xs", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(["a", "b", "c"]));
}

#[test]
fn insert_past_end_appends() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "xs", "a"]);
    run_ok(&config, &["insert_value", "xs", "100", "z"]);
    let stdout = run_ok(&config, &["get", "xs", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(["a", "z"]));
}

#[test]
fn insert_negative_index_counts_from_end() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "xs", "a"]);
    run_ok(&config, &["append_value", "xs", "b"]);
    run_ok(&config, &["insert_value", "xs", "-1", "mid"]);
    let stdout = run_ok(&config, &["get", "xs", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(["a", "mid", "b"]));
}

#[test]
fn remove_value_removes_first_match_only() {
    let (_dir, config) = scratch_config();
    for v in ["a", "b", "a"] {
        run_ok(&config, &["append_value", "xs", v]);
    }
    run_ok(&config, &["remove_value", "xs", "a"]);
    let stdout = run_ok(&config, &["get", "xs", "--json"]);
    assert_eq!(assert_single_json(&stdout), serde_json::json!(["b", "a"]));
}

#[test]
fn remove_value_missing_is_benign() {
    let (_dir, config) = scratch_config();
    run_ok(&config, &["append_value", "xs", "a"]);
    let before = std::fs::read_to_string(&config).unwrap();

    let output = run(&config, &["remove_value", "xs", "zzz"]);
    assert_eq!(output.status.code(), Some(0), "missing value is not an error");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not contained"), "stdout: {}", stdout);
    assert_eq!(std::fs::read_to_string(&config).unwrap(), before);
}

// ===========================================================================
// store initialization failures
// ===========================================================================

#[test]
fn malformed_config_file_is_fatal() {
    let (_dir, config) = scratch_config();
    std::fs::write(&config, "{ not json").unwrap();

    let output = run(&config, &["get", "anything"]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "stderr: {}", stderr);
    assert!(
        stderr.contains("fatal error initializing"),
        "fatal notice missing from stderr: {}",
        stderr
    );
}

#[test]
fn non_object_root_is_fatal() {
    let (_dir, config) = scratch_config();
    std::fs::write(&config, "[1, 2, 3]").unwrap();

    let output = run(&config, &["set", "a", "1"]);
    assert_eq!(output.status.code(), Some(5));
}

// ===========================================================================
// file behavior
// ===========================================================================

#[test]
fn edits_preserve_key_order() {
    let (_dir, config) = scratch_config();
    std::fs::write(&config, r#"{"zebra": 1, "apple": 2}"#).unwrap();
    run_ok(&config, &["set", "mango", "3", "--int"]);

    let text = std::fs::read_to_string(&config).unwrap();
    let zebra = text.find("zebra").unwrap();
    let apple = text.find("apple").unwrap();
    let mango = text.find("mango").unwrap();
    assert!(zebra < apple && apple < mango, "key order changed: {}", text);
}

#[test]
fn config_file_is_created_on_first_write() {
    let (_dir, config) = scratch_config();
    assert!(!config.exists());
    run_ok(&config, &["set", "a", "1", "--int"]);
    assert!(config.exists());

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(value, serde_json::json!({"a": 1}));
}
