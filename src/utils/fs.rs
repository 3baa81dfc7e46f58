//! File system helpers shared by the package collections.
//!
//! JSON package files are written atomically (temp file in the same directory,
//! then rename) so a crash never leaves a half-written collection behind.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sap_cli::utils::fs::{read_json_file, write_json_file};
//! use serde_json::json;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! write_json_file(Path::new("sap.json"), &json!({ "packages": [] }))?;
//! let value: serde_json::Value = read_json_file(Path::new("sap.json"))?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Creates a directory and all of its parents if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created or `path` is a file.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// # Errors
/// Returns an error if the parent directory cannot be created or any step of
/// the write fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    temp.write_all(content)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

/// Reads and parses a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from file: {}", path.display()))
}

/// Writes data as pretty-printed JSON (two-space indent) atomically.
///
/// # Errors
/// Returns an error if serialization fails or the file cannot be written
pub fn write_json_file<T>(path: &Path, data: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let json = serde_json::to_string_pretty(data)
        .with_context(|| format!("Failed to serialize JSON for {}", path.display()))?;
    atomic_write(path, json.as_bytes())
}
