use sap_cli::archive::{build_archive, extract_archive};
use sap_cli::core::SapError;
use sap_cli::pattern::select_files;
use sap_cli::test_utils::write_files;
use std::fs;
use tempfile::TempDir;

use crate::common::SAMPLE_PACKAGE;

#[test]
fn test_round_trip_of_partial_selection() {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("package");
    write_files(&package, SAMPLE_PACKAGE);

    let files = select_files(&package, &["**.txt"]).unwrap();
    let archive = temp.path().join("out/demo-0.0.1.zip");
    build_archive(&archive, &package, &files).unwrap();

    let installed = temp.path().join("installed");
    extract_archive(&archive, &installed).unwrap();

    assert_eq!(fs::read_to_string(installed.join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(installed.join("sub/b.txt")).unwrap(), "bravo");
    assert!(!installed.join("sub/c.png").exists());
}

#[test]
fn test_rebuild_reflects_new_selection() {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("package");
    write_files(&package, SAMPLE_PACKAGE);
    let archive = temp.path().join("demo.zip");

    build_archive(&archive, &package, &select_files(&package, &["**"]).unwrap()).unwrap();
    build_archive(&archive, &package, &select_files(&package, &["sub/*.png"]).unwrap()).unwrap();

    let installed = temp.path().join("installed");
    extract_archive(&archive, &installed).unwrap();
    assert!(installed.join("sub/c.png").is_file());
    assert!(!installed.join("a.txt").exists());
}

#[test]
fn test_extracting_garbage_fails_with_archive_read() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("garbage.zip");
    fs::write(&archive, b"definitely not a zip").unwrap();

    let err = extract_archive(&archive, &temp.path().join("out")).unwrap_err();
    assert!(matches!(err, SapError::ArchiveRead { .. }));
}
