//! Common test utilities for SAP integration tests

// Not every helper is used by every test file
#![allow(dead_code)]

use assert_cmd::Command;
use sap_cli::test_utils::write_files;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated sap home with a publisher project and a consumer project.
///
/// ```text
/// <temp>/
/// ├── home/          # SAP_HOME
/// ├── publisher/     # holds sap-source.json and packages
/// └── project/       # holds sap.json and installed packages
/// ```
pub struct TestProject {
    _temp: TempDir,
    pub sap_home: PathBuf,
    pub publisher: PathBuf,
    pub project: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        sap_cli::test_utils::init_test_logging(None);

        let temp = TempDir::new().unwrap();
        let sap_home = temp.path().join("home");
        let publisher = temp.path().join("publisher");
        let project = temp.path().join("project");
        for dir in [&publisher, &project] {
            std::fs::create_dir_all(dir).unwrap();
        }

        Self {
            _temp: temp,
            sap_home,
            publisher,
            project,
        }
    }

    /// Writes a package directory below the publisher project.
    pub fn write_package(&self, dir: &str, files: &[(&str, &str)]) {
        write_files(&self.publisher.join(dir), files);
    }

    /// `sap` running in the publisher project.
    pub fn publish_cmd(&self) -> Command {
        self.sap_in(&self.publisher)
    }

    /// `sap` running in the consumer project.
    pub fn project_cmd(&self) -> Command {
        self.sap_in(&self.project)
    }

    fn sap_in(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sap"));
        cmd.current_dir(dir)
            .env("SAP_HOME", &self.sap_home)
            .env_remove("SAP_SERVER")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn read_json(&self, path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }
}

/// The package tree used across tests:
///
/// ```text
/// a.txt
/// sub/b.txt
/// sub/c.png
/// ```
pub const SAMPLE_PACKAGE: &[(&str, &str)] =
    &[("a.txt", "alpha"), ("sub/b.txt", "bravo"), ("sub/c.png", "charlie")];
