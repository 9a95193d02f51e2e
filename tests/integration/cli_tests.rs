//! CLI integration tests
//!
//! These tests run the `apisurface` binary and check exit statuses and what
//! lands on stdout for the CI log.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_path().join(name).display().to_string()
}

/// Command rooted in an empty workspace so no stray config is picked up
#[allow(deprecated)]
fn apisurface(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("apisurface").expect("binary");
    cmd.current_dir(root.path())
        .env_remove("ANDROID_BUILD_TOP")
        .env_remove("JAVA_HOME")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root.path());
    cmd
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("update-baseline"));
}

#[test]
fn test_version() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_passes_silently() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["check", "--signature", &fixture("current.txt")])
        .args(["--baseline", &fixture("api-list.txt")])
        .args(["--report", &fixture("report_clean.txt")])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_check_uses_configured_baseline_under_root() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("car-lib")).unwrap();
    fs::copy(
        fixtures_path().join("api-list.txt"),
        root.path().join("car-lib/api-list.txt"),
    )
    .unwrap();
    fs::write(
        root.path().join(".apisurface.toml"),
        "[baseline]\npath = \"car-lib/api-list.txt\"\n",
    )
    .unwrap();

    apisurface(&root)
        .args(["check", "--signature", &fixture("current.txt")])
        .assert()
        .code(0);
}

#[test]
fn test_check_reports_new_symbol() {
    let root = TempDir::new().unwrap();
    let signature = root.path().join("current.txt");
    let text = fs::read_to_string(fixtures_path().join("current.txt")).unwrap();
    fs::write(
        &signature,
        text.replace(
            "    method public boolean isConnected();\n",
            "    method public boolean isConnected();\n    method public void disconnect();\n",
        ),
    )
    .unwrap();

    apisurface(&root)
        .arg("check")
        .arg("--signature")
        .arg(&signature)
        .args(["--baseline", &fixture("api-list.txt")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("new:\n  android.car.Car.disconnect\n"))
        .stdout(predicate::str::contains("update-baseline"));
}

#[test]
fn test_check_echoes_annotation_violations_in_order() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["check", "--signature", &fixture("current.txt")])
        .args(["--baseline", &fixture("api-list.txt")])
        .args(["--report", &fixture("report.txt")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "android.car.media.CarAudioManager#setGroupVolume(int,int,int,int) is used in CarAudioService without @AddedInOrBefore\n\
             android.car.Car#getCarManager(String) is used in CarServiceHelper without @AddedInOrBefore\n",
        ));
}

#[test]
fn test_check_json_output() {
    let root = TempDir::new().unwrap();
    let output = apisurface(&root)
        .args(["check", "--format", "json"])
        .args(["--signature", &fixture("current.txt")])
        .args(["--baseline", &fixture("api-list.txt")])
        .args(["--report", &fixture("report.txt")])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["passed"], false);
    assert_eq!(body["failures"][0]["policy"], "annotation_compliance");
    assert_eq!(body["failures"][0]["violations"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_check_bad_header_is_fatal() {
    let root = TempDir::new().unwrap();
    let signature = root.path().join("current.txt");
    fs::write(&signature, "// Signature format: 3.0\npackage a {\n}\n").unwrap();

    apisurface(&root)
        .arg("check")
        .arg("--signature")
        .arg(&signature)
        .args(["--baseline", &fixture("api-list.txt")])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("signature"));
}

#[test]
fn test_check_missing_baseline_is_fatal() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["check", "--signature", &fixture("current.txt")])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("baseline"));
}

#[test]
fn test_check_missing_section_is_fatal() {
    let root = TempDir::new().unwrap();
    let report = root.path().join("report.txt");
    fs::write(&report, "Start-classes\nandroid.car.Car\n").unwrap();

    apisurface(&root)
        .args(["check", "--signature", &fixture("current.txt")])
        .args(["--baseline", &fixture("api-list.txt")])
        .arg("--report")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Start-annotation-violations"));
}

#[test]
fn test_extract_without_jdk_is_fatal() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["check", "--extract", "--signature", &fixture("current.txt")])
        .args(["--baseline", &fixture("api-list.txt")])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("JDK"));
}

// ============================================================================
// Other subcommands
// ============================================================================

#[test]
fn test_update_baseline_writes_sorted_list() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("nested/api-list.txt");

    apisurface(&root)
        .args(["update-baseline", "--signature", &fixture("current.txt")])
        .arg("--baseline")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("10 symbols"));

    let written = fs::read_to_string(&out).unwrap();
    let expected = fs::read_to_string(fixtures_path().join("api-list.txt")).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn test_symbols_classes() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["symbols", "--kind", "classes", "--signature", &fixture("current.txt")])
        .assert()
        .success()
        .stdout("android.car.Car\nandroid.car.CarInfoManager\nandroid.car.media.CarAudioManager\n");
}

#[test]
fn test_symbols_signatures_keep_overloads() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["symbols", "--kind", "signatures", "--signature", &fixture("current.txt")])
        .assert()
        .success()
        .stdout(predicate::str::contains("createCar(android.content.Context)\n"))
        .stdout(predicate::str::contains(
            "createCar(android.content.Context, android.os.Handler)\n",
        ));
}

#[test]
fn test_sections_summary() {
    let root = TempDir::new().unwrap();
    apisurface(&root)
        .args(["sections", "--report", &fixture("report.txt")])
        .assert()
        .success()
        .stdout(predicate::str::contains("classes: 3 lines"))
        .stdout(predicate::str::contains("annotation-violations: 2 lines"));
}
