use sap_cli::core::SapError;
use sap_cli::pattern::{PatternMatcher, compile_patterns, find_files, select_files};
use sap_cli::test_utils::write_files;
use tempfile::TempDir;

use crate::common::SAMPLE_PACKAGE;

fn sample() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_files(temp.path(), SAMPLE_PACKAGE);
    temp
}

#[test]
fn test_selection_scenarios() {
    let temp = sample();
    let root = temp.path();

    assert_eq!(select_files(root, &["sub/*"]).unwrap(), vec!["sub/b.txt", "sub/c.png"]);
    assert_eq!(select_files(root, &["**"]).unwrap(), vec!["a.txt", "sub/b.txt", "sub/c.png"]);
    assert_eq!(select_files(root, &["*.txt"]).unwrap(), vec!["a.txt"]);
    assert_eq!(select_files(root, &["**.png"]).unwrap(), vec!["sub/c.png"]);
    assert_eq!(select_files(root, &["./sub/*.txt"]).unwrap(), vec!["sub/b.txt"]);
}

#[test]
fn test_single_star_png_is_empty_selection() {
    let temp = sample();
    let err = select_files(temp.path(), &["*.png"]).unwrap_err();
    match err {
        SapError::EmptySelection { patterns, .. } => assert_eq!(patterns, vec!["*.png"]),
        other => panic!("expected EmptySelection, got {other:?}"),
    }
}

#[test]
fn test_overlapping_patterns_select_each_file_once() {
    let temp = sample();
    let files = select_files(temp.path(), &["**", "sub/*", "*.txt", "**.txt"]).unwrap();
    assert_eq!(files, vec!["a.txt", "sub/b.txt", "sub/c.png"]);
}

#[test]
fn test_order_is_lexicographic_per_directory() {
    let temp = TempDir::new().unwrap();
    write_files(
        temp.path(),
        &[("b/z.txt", ""), ("a.txt", ""), ("b/a.txt", ""), ("c.txt", ""), ("a/y.txt", "")],
    );

    let files = select_files(temp.path(), &["**"]).unwrap();
    assert_eq!(files, vec!["a/y.txt", "a.txt", "b/a.txt", "b/z.txt", "c.txt"]);
}

#[test]
fn test_matchers_are_reusable_across_roots() {
    let first = sample();
    let second = TempDir::new().unwrap();
    write_files(second.path(), &[("sub/only.txt", "x")]);

    let matchers: Vec<PatternMatcher> = compile_patterns(&["sub/*"]).unwrap();
    assert_eq!(find_files(first.path(), &matchers).unwrap().len(), 2);
    assert_eq!(find_files(second.path(), &matchers).unwrap(), vec!["sub/only.txt"]);
}

#[test]
fn test_missing_root_is_reported() {
    let temp = TempDir::new().unwrap();
    let err = select_files(&temp.path().join("absent"), &["**"]).unwrap_err();
    assert!(matches!(err, SapError::DirectoryNotFound { .. }));
}
