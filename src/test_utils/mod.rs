//! Test utilities for SAP
//!
//! Helpers shared by unit tests and the integration suite (enabled there via
//! the `test-utils` feature).
//!
//! # Example
//!
//! ```rust,no_run
//! use sap_cli::test_utils::{init_test_logging, write_files};
//!
//! init_test_logging(None);
//! let temp = tempfile::tempdir().unwrap();
//! write_files(temp.path(), &[("a.txt", "a"), ("sub/b.txt", "b")]);
//! ```

use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a test-writer subscriber once per process. Uses `level` when given,
/// otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Writes `(relative path, contents)` pairs below `root`, creating parent
/// directories.
///
/// # Panics
///
/// Panics if a directory or file cannot be written.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create {}: {e}", parent.display());
            });
        }
        std::fs::write(&path, contents).unwrap_or_else(|e| {
            panic!("Failed to write {}: {e}", path.display());
        });
    }
}
