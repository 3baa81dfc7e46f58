use predicates::prelude::*;
use std::fs;

use crate::common::{SAMPLE_PACKAGE, TestProject};

/// Publishes `demo` at 0.0.1 and then 0.0.2, with a version marker file.
fn publish_two_versions(env: &TestProject) {
    env.write_package("pkg", SAMPLE_PACKAGE);
    env.write_package("pkg", &[("version.txt", "0.0.1")]);
    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg"]).assert().success();

    env.write_package("pkg", &[("version.txt", "0.0.2")]);
    env.publish_cmd().args(["source", "up", "demo"]).assert().success();
}

#[test]
fn test_save_installs_latest_and_lists_it() {
    let env = TestProject::new();
    publish_two_versions(&env);

    env.project_cmd()
        .args(["save", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"))
        .stdout(predicate::str::contains("0.0.2"));

    let installed = env.project.join("demo");
    assert_eq!(fs::read_to_string(installed.join("version.txt")).unwrap(), "0.0.2");
    assert_eq!(fs::read_to_string(installed.join("sub/b.txt")).unwrap(), "bravo");

    let target = env.read_json(&env.project.join("sap.json"));
    assert_eq!(target["packages"][0]["name"], "demo");
    assert_eq!(target["packages"][0]["version"], "0.0.2");
    assert_eq!(target["packages"][0]["path"], "demo");

    assert!(env.sap_home.join("manifest.json").is_file());
    assert!(env.sap_home.join("cache").is_dir());

    env.project_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("0.0.2"))
        .stdout(predicate::str::contains("Total"));
}

#[test]
fn test_save_with_requirement_and_path() {
    let env = TestProject::new();
    publish_two_versions(&env);

    env.project_cmd().args(["save", "demo<=0.0.1", "-p", "vendor/demo"]).assert().success();

    let marker = env.project.join("vendor/demo/version.txt");
    assert_eq!(fs::read_to_string(marker).unwrap(), "0.0.1");
}

#[test]
fn test_downgrade_declined_keeps_newer_version() {
    let env = TestProject::new();
    publish_two_versions(&env);
    env.project_cmd().args(["save", "demo"]).assert().success();

    env.project_cmd()
        .args(["save", "demo==0.0.1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("install an older (0.0.1) version over a newer (0.0.2) one?"))
        .stdout(predicate::str::contains("Skipped"));

    let marker = env.project.join("demo/version.txt");
    assert_eq!(fs::read_to_string(&marker).unwrap(), "0.0.2");

    env.project_cmd().args(["-y", "save", "demo==0.0.1"]).assert().success();
    assert_eq!(fs::read_to_string(&marker).unwrap(), "0.0.1");
}

#[test]
fn test_save_without_arguments_reinstalls_target_file() {
    let env = TestProject::new();
    publish_two_versions(&env);
    env.project_cmd().args(["save", "demo==0.0.1", "-p", "libs/demo"]).assert().success();

    fs::remove_dir_all(env.project.join("libs/demo")).unwrap();
    env.project_cmd().arg("save").assert().success();

    let marker = env.project.join("libs/demo/version.txt");
    assert_eq!(fs::read_to_string(marker).unwrap(), "0.0.1");
}

#[test]
fn test_remove_uninstalls_files() {
    let env = TestProject::new();
    publish_two_versions(&env);
    env.project_cmd().args(["save", "demo"]).assert().success();

    env.project_cmd()
        .args(["remove", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    assert!(!env.project.join("demo").exists());
    let target = env.read_json(&env.project.join("sap.json"));
    assert_eq!(target["packages"], serde_json::json!([]));

    env.project_cmd()
        .args(["remove", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is not installed"));
}

#[test]
fn test_save_unknown_package_fails() {
    let env = TestProject::new();

    env.project_cmd()
        .args(["save", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package 'ghost' not found"));
}

#[test]
fn test_list_with_nothing_installed() {
    let env = TestProject::new();

    env.project_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No installed packages found."));
}

#[test]
fn test_failed_upgrade_keeps_installed_version() {
    let env = TestProject::new();
    publish_two_versions(&env);
    env.project_cmd().args(["save", "demo==0.0.1"]).assert().success();

    fs::remove_file(env.sap_home.join("registry/demo-0.0.2.zip")).unwrap();
    env.project_cmd().args(["save", "demo"]).assert().failure();

    let marker = env.project.join("demo/version.txt");
    assert_eq!(fs::read_to_string(marker).unwrap(), "0.0.1");
    let target = env.read_json(&env.project.join("sap.json"));
    assert_eq!(target["packages"][0]["version"], "0.0.1");
    let manifest = env.read_json(&env.sap_home.join("manifest.json"));
    assert_eq!(manifest["packages"][0]["version"], "0.0.1");
}

#[test]
fn test_remove_from_project_root_keeps_unrelated_dirs() {
    let env = TestProject::new();
    publish_two_versions(&env);
    fs::create_dir_all(env.project.join("build/empty")).unwrap();

    env.project_cmd().args(["save", "demo", "-p", "."]).assert().success();
    assert!(env.project.join("sub/b.txt").is_file());

    env.project_cmd().args(["remove", "demo"]).assert().success();
    assert!(!env.project.join("version.txt").exists());
    assert!(!env.project.join("sub").exists());
    assert!(env.project.join("build/empty").is_dir());
    assert!(env.project.join("sap.json").is_file());
}
