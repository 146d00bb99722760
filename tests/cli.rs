mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::vessel;

fn container(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("vessel.nc");
    poem::to_netcdf(&vessel(), "vessel", &path).unwrap();
    path
}

fn poem_cmd() -> Command {
    Command::cargo_bin("poem").unwrap()
}

#[test]
fn test_check_compliant_container() {
    let dir = TempDir::new().unwrap();
    let path = container(&dir);

    poem_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("compliant with POEM v1"));
}

#[test]
fn test_check_reports_violations_and_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("incomplete.nc");
    let mut root = vessel();
    root.remove_path("/MPPP/TOTAL_POWER").unwrap();
    poem::to_netcdf(&root, "vessel", &path).unwrap();

    poem_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[R5]").and(predicate::str::contains("TOTAL_POWER")));
}

#[test]
fn test_version_and_tree() {
    let dir = TempDir::new().unwrap();
    let path = container(&dir);

    poem_cmd()
        .arg("version")
        .arg(&path)
        .assert()
        .success()
        .stdout("v1\n");

    poem_cmd()
        .arg("tree")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("vessel [PolarSet]"))
        .stdout(predicate::str::contains("└── MPPP [Polar MPPP]"))
        .stdout(predicate::str::contains("SOLVER_STATUS (int"));
}

#[test]
fn test_layout_and_info() {
    let dir = TempDir::new().unwrap();
    let path = container(&dir);

    poem_cmd()
        .arg("layout")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"vessel":{"MPPP":["TOTAL_POWER""#));

    poem_cmd()
        .arg("info")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Polar: /MPPP"))
        .stdout(predicate::str::contains("Tables (4)"));
}

#[test]
fn test_clean_writes_output() {
    let dir = TempDir::new().unwrap();
    let path = container(&dir);
    let output = dir.path().join("clean.nc");

    poem_cmd()
        .arg("clean")
        .arg(&path)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 tables"));

    let cleaned = poem::load(&output).unwrap();
    assert!(!cleaned.exists("/MPPP/BRAKE_POWER"));
    assert!(poem::load(&path).unwrap().exists("/MPPP/BRAKE_POWER"));
}

#[test]
fn test_missing_file() {
    poem_cmd()
        .arg("check")
        .arg("does-not-exist.nc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}
