//! Shared helpers
//!
//! - [`fs`] - atomic writes and JSON file I/O
//! - [`timestamp`] - the timestamp string stored in package records

pub mod fs;

pub use fs::{atomic_write, ensure_dir, read_json_file, write_json_file};

use crate::constants::TIMESTAMP_FORMAT;

/// Current local time formatted for `modified` and `created` fields.
#[must_use]
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
