//! Package archive creation and extraction.
//!
//! A package archive is a deflate-compressed zip whose entry names are exactly
//! the relative paths of the package's file selection, rooted at the package
//! directory. Archives are derived artifacts: they are rebuilt whenever a
//! package's file selection changes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sap_cli::archive::{build_archive, extract_archive};
//! use sap_cli::pattern::select_files;
//! use std::path::Path;
//!
//! # fn example() -> sap_cli::core::Result<()> {
//! let base = Path::new("packages/demo");
//! let files = select_files(base, &["**"])?;
//! build_archive(Path::new("demo-0.0.1.zip"), base, &files)?;
//! extract_archive(Path::new("demo-0.0.1.zip"), Path::new("installed/demo"))?;
//! # Ok(())
//! # }
//! ```

use crate::core::{Result, SapError};
use crate::pattern::{FileSelection, normalize_relative_path};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Creates a new archive at `output_path` holding `files` read from `base_dir`.
///
/// Any existing file at `output_path` is replaced. The archive is assembled in
/// a temporary file beside the destination and only moved into place once it
/// has been completely written, so a failure leaves the previous archive (if
/// any) untouched.
///
/// # Errors
///
/// Returns [`SapError::ArchiveWrite`] if a listed file cannot be read or the
/// archive cannot be created.
pub fn build_archive<S: AsRef<str>>(output_path: &Path, base_dir: &Path, files: &[S]) -> Result<()> {
    info!("Building package file {}", output_path.display());

    let parent = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| SapError::archive_write(output_path, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| SapError::archive_write(output_path, e))?;
    debug!("Temporary package file path: {}", temp.path().display());

    {
        let mut writer = ZipWriter::new(temp.as_file_mut());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for name in files {
            let name = name.as_ref();
            let source = base_dir.join(name);
            let contents = fs::read(&source).map_err(|e| {
                SapError::archive_write(output_path, format!("cannot read {}: {e}", source.display()))
            })?;

            writer
                .start_file(name, options)
                .map_err(|e| SapError::archive_write(output_path, e))?;
            writer.write_all(&contents).map_err(|e| SapError::archive_write(output_path, e))?;
            debug!("Added {} ({} bytes)", name, contents.len());
        }

        writer.finish().map_err(|e| SapError::archive_write(output_path, e))?;
    }

    temp.persist(output_path).map_err(|e| SapError::archive_write(output_path, e.error))?;
    Ok(())
}

/// Lists the files held by the archive at `archive_path`, as relative paths
/// with `/` separators, without extracting anything.
///
/// # Errors
///
/// Returns [`SapError::ArchiveRead`] if the archive cannot be opened or is
/// corrupt, or if an entry name would land outside the extraction directory.
pub fn archive_entries(archive_path: &Path) -> Result<FileSelection> {
    let file = File::open(archive_path).map_err(|e| SapError::archive_read(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| SapError::archive_read(archive_path, e))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| SapError::archive_read(archive_path, e))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(escaping_entry(archive_path, entry.name()));
        };
        if !entry.is_dir() {
            entries.push(normalize_relative_path(&relative.to_string_lossy()));
        }
    }
    Ok(entries)
}

/// Expands every entry of the archive at `archive_path` under `output_dir`.
///
/// Intermediate directories are created as needed and existing files are
/// overwritten.
///
/// # Errors
///
/// Returns [`SapError::ArchiveRead`] if the archive cannot be opened or is
/// corrupt, or if an entry name would land outside `output_dir`. Failures
/// writing the extracted files are reported as [`SapError::FileSystemError`].
pub fn extract_archive(archive_path: &Path, output_dir: &Path) -> Result<()> {
    info!("Extracting {} into {}", archive_path.display(), output_dir.display());

    let file = File::open(archive_path).map_err(|e| SapError::archive_read(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| SapError::archive_read(archive_path, e))?;

    for index in 0..archive.len() {
        let mut entry =
            archive.by_index(index).map_err(|e| SapError::archive_read(archive_path, e))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(escaping_entry(archive_path, entry.name()));
        };
        let destination = output_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination).map_err(|e| fs_error("creating directory", &destination, &e))?;
            continue;
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error("creating directory", parent, &e))?;
        }

        let mut out = File::create(&destination).map_err(|e| fs_error("creating file", &destination, &e))?;
        io::copy(&mut entry, &mut out).map_err(|e| SapError::archive_read(archive_path, e))?;
        debug!("Extracted {}", destination.display());
    }

    Ok(())
}

fn escaping_entry(archive_path: &Path, name: &str) -> SapError {
    SapError::archive_read(archive_path, format!("entry '{name}' escapes the output directory"))
}

fn fs_error(operation: &str, path: &Path, error: &io::Error) -> SapError {
    SapError::FileSystemError {
        operation: format!("{operation} ({error})"),
        path: path.display().to_string(),
    }
}
