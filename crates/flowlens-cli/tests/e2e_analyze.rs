//! E2E CLI tests covering:
//! - `flowlens analyze` JSON contract from a file and from stdin
//! - Input failures (missing file, malformed JSON) and their error codes
//! - Config file and flag overrides
//! - `flowlens paths` and `flowlens cycles`
//!
//! Each test runs the `flowlens` binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the flowlens binary, rooted in `dir`.
fn flowlens_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flowlens"));
    cmd.current_dir(dir);
    cmd.env("FLOWLENS_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("RUST_BACKTRACE");
    cmd.env_remove("RUST_LIB_BACKTRACE");
    cmd
}

fn click(id: &str, from: &str, to: &str) -> Value {
    serde_json::json!({
        "id": id,
        "sourceNodeId": from,
        "trigger": { "type": "ON_CLICK" },
        "action": { "type": "NODE", "destinationId": to }
    })
}

/// home → list → detail → list, plus a back action from detail.
fn sample_connections() -> Value {
    Value::Array(vec![
        click("c1", "home", "list"),
        click("c2", "list", "detail"),
        click("c3", "detail", "list"),
        serde_json::json!({
            "id": "c4",
            "sourceNodeId": "detail",
            "trigger": { "type": "ON_CLICK" },
            "action": { "type": "BACK" }
        }),
    ])
}

fn write_input(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).expect("serialize")).expect("write input");
    path
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = flowlens_cmd(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("flowlens should not crash");
    assert!(
        output.status.success(),
        "flowlens {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_file_emits_result_record() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());

    let json = run_json(dir.path(), &["analyze", "flows.json"]);

    assert_eq!(json["metadata"]["totalConnections"], 4);
    assert_eq!(json["metadata"]["uniqueScreens"], 3);
    assert_eq!(json["flows"]["deadEnds"], serde_json::json!(["home"]));
    assert!(json["flows"]["loops"].as_array().is_some_and(|l| !l.is_empty()));
    assert!(
        json["metadata"]["contentHash"]
            .as_str()
            .is_some_and(|h| h.starts_with("blake3:"))
    );
    assert!(json.get("error").is_none());
}

#[test]
fn analyze_reads_stdin_and_wrapped_object() {
    let dir = TempDir::new().expect("tempdir");
    let wrapped = serde_json::json!({ "connections": sample_connections() });

    let output = flowlens_cmd(dir.path())
        .args(["analyze", "-", "--json"])
        .write_stdin(serde_json::to_string(&wrapped).expect("serialize"))
        .output()
        .expect("flowlens should not crash");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["metadata"]["totalConnections"], 4);
}

#[test]
fn analyze_empty_list_is_not_an_error() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "empty.json", &serde_json::json!([]));

    let json = run_json(dir.path(), &["analyze", "empty.json"]);

    assert_eq!(json["metadata"]["totalConnections"], 0);
    assert_eq!(json["flows"]["paths"], serde_json::json!([]));
    assert_eq!(json["validation"]["score"], 1.0);
}

#[test]
fn analyze_missing_file_reports_e1001() {
    let dir = TempDir::new().expect("tempdir");

    flowlens_cmd(dir.path())
        .args(["analyze", "nope.json", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn analyze_malformed_json_reports_e1002() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("bad.json"), "[{").expect("write");

    let output = flowlens_cmd(dir.path())
        .args(["analyze", "bad.json", "--format", "json"])
        .output()
        .expect("flowlens should not crash");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.find('{').expect("JSON error on stderr");
    let end = stderr.rfind('}').expect("JSON error on stderr");
    let json: Value = serde_json::from_str(&stderr[start..=end]).expect("error JSON");
    assert_eq!(json["error"]["error_code"], "E1002");
}

#[test]
fn analyze_text_output_is_compact() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());

    flowlens_cmd(dir.path())
        .args(["analyze", "flows.json", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("connections 4  screens 3"))
        .stdout(predicate::str::contains("dead_ends home"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn project_config_is_applied() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());
    std::fs::create_dir_all(dir.path().join(".flowlens")).expect("mkdir");
    std::fs::write(
        dir.path().join(".flowlens/config.toml"),
        "[analysis]\nentry_point_policy = \"sources_never_targets\"\n",
    )
    .expect("write config");

    let json = run_json(dir.path(), &["analyze", "flows.json"]);
    assert_eq!(json["flows"]["entryPoints"], serde_json::json!(["home"]));
}

#[test]
fn invalid_config_file_reports_e2001() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());
    std::fs::write(dir.path().join("broken.toml"), "[analysis\n").expect("write config");

    flowlens_cmd(dir.path())
        .args(["analyze", "flows.json", "--config", "broken.toml", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"));
}

#[test]
fn zero_depth_flag_reports_e2002() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());

    flowlens_cmd(dir.path())
        .args(["analyze", "flows.json", "--max-depth", "0", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"));
}

// ---------------------------------------------------------------------------
// paths / cycles
// ---------------------------------------------------------------------------

#[test]
fn paths_from_single_start() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());

    let json = run_json(dir.path(), &["paths", "flows.json", "--from", "home"]);

    let paths = json["paths"].as_array().expect("paths array");
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p["start"] == "home"));
    assert_eq!(json["statistics"]["totalPaths"], paths.len());
}

#[test]
fn cycles_lists_list_detail_loop() {
    let dir = TempDir::new().expect("tempdir");
    write_input(dir.path(), "flows.json", &sample_connections());

    let json = run_json(dir.path(), &["cycles", "flows.json"]);

    let loops = json["loops"].as_array().expect("loops array");
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0]["type"], "direct");
    assert_eq!(loops[0]["nodes"], serde_json::json!(["list", "detail"]));
    assert_eq!(json["truncated"], false);
}
