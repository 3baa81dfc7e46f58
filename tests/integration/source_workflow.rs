use predicates::prelude::*;

use crate::common::{SAMPLE_PACKAGE, TestProject};

#[test]
fn test_source_add_builds_release_and_publishes() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);

    env.publish_cmd()
        .args(["-y", "source", "add", "Demo", "pkg", "-p", "sub/*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"))
        .stdout(predicate::str::contains("demo"));

    let source = env.read_json(&env.publisher.join("sap-source.json"));
    let package = &source["packages"][0];
    assert_eq!(package["name"], "demo");
    assert_eq!(package["version"], "0.0.1");
    assert_eq!(package["path"], "pkg");
    assert_eq!(package["patterns"], serde_json::json!(["sub/*"]));
    assert_eq!(package["files"], serde_json::json!(["sub/b.txt", "sub/c.png"]));

    assert!(env.publisher.join("demo-0.0.1.zip").is_file());
    assert!(env.publisher.join("demo-0.0.1.json").is_file());
    assert!(env.sap_home.join("registry/demo-0.0.1.zip").is_file());
    assert!(env.sap_home.join("registry/demo-0.0.1.json").is_file());
}

#[test]
fn test_source_add_local_does_not_publish() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);

    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg", "--local"]).assert().success();

    assert!(env.publisher.join("demo-0.0.1.zip").is_file());
    assert!(!env.sap_home.join("registry").exists());
}

#[test]
fn test_source_add_declining_creation_writes_nothing() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);

    env.publish_cmd()
        .args(["source", "add", "demo", "pkg"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist, create it? [Y/n]"))
        .stdout(predicate::str::contains("Cancelled."));

    assert!(!env.publisher.join("sap-source.json").exists());
}

#[test]
fn test_source_add_empty_selection_fails() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);

    env.publish_cmd()
        .args(["-y", "source", "add", "demo", "pkg", "-p", "*.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files"))
        .stderr(predicate::str::contains("suggestion"));

    let source = env.read_json(&env.publisher.join("sap-source.json"));
    assert_eq!(source["packages"], serde_json::json!([]));
}

#[test]
fn test_source_update_bumps_patch_version() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);
    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg"]).assert().success();

    env.publish_cmd()
        .args(["source", "up", "demo", "-p", "*.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let source = env.read_json(&env.publisher.join("sap-source.json"));
    assert_eq!(source["packages"][0]["version"], "0.0.2");
    assert_eq!(source["packages"][0]["files"], serde_json::json!(["a.txt"]));
    assert!(env.sap_home.join("registry/demo-0.0.2.zip").is_file());
}

#[test]
fn test_source_update_unknown_package_fails() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);
    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg"]).assert().success();

    env.publish_cmd()
        .args(["source", "update", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did you mean 'sap source add'"));
}

#[test]
fn test_source_add_existing_package_updates_when_confirmed() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);
    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg"]).assert().success();

    env.publish_cmd()
        .args(["source", "add", "demo", "pkg", "-v", "2.0.0"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, overwrite?"));

    let source = env.read_json(&env.publisher.join("sap-source.json"));
    assert_eq!(source["packages"].as_array().unwrap().len(), 1);
    assert_eq!(source["packages"][0]["version"], "2.0.0");
}

#[test]
fn test_source_remove_all_requires_confirmation() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);
    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg"]).assert().success();

    env.publish_cmd()
        .args(["source", "rm"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));
    let source = env.read_json(&env.publisher.join("sap-source.json"));
    assert_eq!(source["packages"].as_array().unwrap().len(), 1);

    env.publish_cmd().args(["-y", "source", "remove"]).assert().success();
    let source = env.read_json(&env.publisher.join("sap-source.json"));
    assert_eq!(source["packages"], serde_json::json!([]));
    assert!(!env.sap_home.join("registry/demo-0.0.1.zip").exists());
}

#[test]
fn test_source_push_republishes() {
    let env = TestProject::new();
    env.write_package("pkg", SAMPLE_PACKAGE);
    env.publish_cmd().args(["-y", "source", "add", "demo", "pkg", "-l"]).assert().success();

    env.publish_cmd()
        .args(["source", "push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pushed"));
    assert!(env.sap_home.join("registry/demo-0.0.1.json").is_file());
}
