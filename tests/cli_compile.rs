use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use serial_test::serial;
use tempfile::TempDir;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

/// Command running in an empty directory so no local config leaks in.
fn specforge(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("specforge").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("SPECFORGE_OUTPUT_DIR")
        .env_remove("SPECFORGE_SUITE_TITLE")
        .env_remove("SPECFORGE_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn compile_into(workdir: &TempDir, out: &Path) {
    specforge(workdir)
        .args(["compile", "--scenarios"])
        .arg(demo("scenarios.json"))
        .arg("--knowledge")
        .arg(demo("knowledge.json"))
        .arg("--out")
        .arg(out)
        .args(["--title", "Calculator Suite"])
        .assert()
        .success();
}

#[test]
#[serial]
fn compile_writes_the_artifact_pair_and_manifest() {
    let workdir = TempDir::new().unwrap();
    let out = workdir.path().join("out");
    compile_into(&workdir, &out);

    let spec = fs::read_to_string(out.join("generated.spec")).unwrap();
    let bindings = fs::read_to_string(out.join("step_impl.py")).unwrap();
    assert!(spec.starts_with("# Calculator Suite\n"));
    assert!(spec.contains("## LOAN_TC_001: Standard monthly payment\ntags: smoke, loan\n"));
    assert!(spec.contains("* Verify result contains \"$599.55\""));
    assert!(!spec.contains("HOME_TC_001"), "search-box misuse scenario survives");
    assert!(!spec.contains("MORTGAGE"));
    assert!(bindings.contains("from getgauge.python import step"));
    assert!(bindings.contains("BASE_URL = \"https://www.calculator.net\""));

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert!(manifest["run_id"].is_string());
    assert!(manifest["generated_at"].is_string());
    let spec_digest = blake3::hash(spec.as_bytes()).to_hex().to_string();
    assert_eq!(manifest["artifacts"][0]["file"], "generated.spec");
    assert_eq!(manifest["artifacts"][0]["blake3"], spec_digest.as_str());
    assert!(manifest["templates"]["Navigate to <path>"].is_string());
    assert_eq!(manifest["summary"]["stub_bindings"], 0);
    assert_eq!(manifest["summary"]["compile"]["pages_skipped"], 1);

    let steps: Vec<&str> = spec.lines().filter_map(|l| l.strip_prefix("* ")).collect();
    assert!(!steps.is_empty());
    for template in manifest["templates"].as_object().unwrap().values() {
        let name = template.as_str().unwrap();
        assert!(bindings.contains(&format!("def {name}(")), "no def for {name}");
    }
}

#[test]
#[serial]
fn recompiling_is_byte_identical_and_keeps_foreign_files() {
    let workdir = TempDir::new().unwrap();
    let out = workdir.path().join("out");
    compile_into(&workdir, &out);
    let first_spec = fs::read(out.join("generated.spec")).unwrap();
    let first_bindings = fs::read(out.join("step_impl.py")).unwrap();
    let first_manifest = fs::read_to_string(out.join("manifest.json")).unwrap();
    fs::write(out.join("README.md"), "kept by the user").unwrap();

    compile_into(&workdir, &out);
    assert_eq!(fs::read(out.join("generated.spec")).unwrap(), first_spec);
    assert_eq!(fs::read(out.join("step_impl.py")).unwrap(), first_bindings);
    assert_ne!(
        fs::read_to_string(out.join("manifest.json")).unwrap(),
        first_manifest
    );
    assert_eq!(
        fs::read_to_string(out.join("README.md")).unwrap(),
        "kept by the user"
    );

    let siblings: Vec<_> = fs::read_dir(workdir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".out."))
        .collect();
    assert!(siblings.is_empty(), "leftover staging dirs: {siblings:?}");
}

#[test]
#[serial]
fn config_file_and_environment_shape_the_output() {
    let workdir = TempDir::new().unwrap();
    let config = workdir.path().join("specforge.yaml");
    fs::write(
        &config,
        "suite_title: From File\nartifacts:\n  spec_file: specs/suite.spec\nbindings:\n  base_url: https://file.example\n",
    )
    .unwrap();
    let out = workdir.path().join("out");

    specforge(&workdir)
        .arg("--config")
        .arg(&config)
        .args(["compile", "--scenarios"])
        .arg(demo("scenarios.json"))
        .arg("--knowledge")
        .arg(demo("knowledge.json"))
        .arg("--out")
        .arg(&out)
        .env("SPECFORGE_BASE_URL", "https://env.example")
        .assert()
        .success();

    let spec = fs::read_to_string(out.join("specs/suite.spec")).unwrap();
    assert!(spec.starts_with("# From File\n"));
    let bindings = fs::read_to_string(out.join("step_impl.py")).unwrap();
    assert!(bindings.contains("BASE_URL = \"https://env.example\""));
}

#[test]
#[serial]
fn local_env_file_sets_missing_variables() {
    let workdir = TempDir::new().unwrap();
    fs::create_dir_all(workdir.path().join("config")).unwrap();
    fs::write(
        workdir.path().join("config/local.env"),
        "SPECFORGE_SUITE_TITLE=\"Local Env Suite\"\n",
    )
    .unwrap();
    let out = workdir.path().join("out");

    specforge(&workdir)
        .args(["compile", "--scenarios"])
        .arg(demo("scenarios.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let spec = fs::read_to_string(out.join("generated.spec")).unwrap();
    assert!(spec.starts_with("# Local Env Suite\n"));
}

#[test]
fn missing_scenario_file_fails_without_output() {
    let workdir = TempDir::new().unwrap();
    let out = workdir.path().join("out");
    specforge(&workdir)
        .args(["compile", "--scenarios", "does-not-exist.json", "--out"])
        .arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
}
