use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn specforge(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("specforge").unwrap();
    cmd.current_dir(workdir.path()).env_remove("RUST_LOG");
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn canon_prints_canonical_steps_and_discards() {
    let workdir = TempDir::new().unwrap();
    let text = stdout(specforge(&workdir).args([
        "canon",
        "Navigate to \"/loan-calculator.html\"",
        "dance wildly",
    ]));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Navigate to \"/loan-calculator.html\"");
    assert!(lines[1].starts_with("# discarded (unknown_verb)"));
}

#[test]
fn canon_json_reports_each_step() {
    let workdir = TempDir::new().unwrap();
    let text = stdout(specforge(&workdir).args(["--output", "json", "canon", "Click \"x\"", ""]));
    let rows: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(rows[0]["canonical"], "Click \"x\"");
    assert_eq!(rows[1]["discarded"], "empty");
}

#[test]
fn oracle_prints_the_formatted_payment() {
    let workdir = TempDir::new().unwrap();
    let text = stdout(specforge(&workdir).args([
        "oracle",
        "--principal",
        "100000",
        "--rate",
        "6",
        "--years",
        "30",
    ]));
    assert_eq!(text.trim(), "$599.55");
}

#[test]
fn oracle_rejects_a_zero_rate() {
    let workdir = TempDir::new().unwrap();
    specforge(&workdir)
        .args(["oracle", "--principal", "1000", "--rate", "0", "--years", "5"])
        .assert()
        .failure();
}

#[test]
fn templates_lists_every_binding() {
    let workdir = TempDir::new().unwrap();
    let text = stdout(
        specforge(&workdir)
            .args(["--output", "json", "templates", "--scenarios"])
            .arg(demo("scenarios.json"))
            .arg("--knowledge")
            .arg(demo("knowledge.json")),
    );
    let bindings: Value = serde_json::from_str(&text).unwrap();
    let bindings = bindings.as_array().unwrap();
    assert!(!bindings.is_empty());
    assert!(bindings
        .iter()
        .all(|b| b["kind"]["kind"] == "pattern" && b["uses"].as_u64().unwrap() > 0));
    assert!(bindings
        .iter()
        .any(|b| b["template"]["text"] == "Enter <value> into <element_id>"));
}
