//! The manifest of packages installed on this machine.
//!
//! Lives at `<sap dir>/manifest.json` and uses the same `{"packages": [...]}`
//! layout as the other package files. Each record's `files` list holds the
//! installed file paths so the package can be uninstalled later. Every
//! mutation is saved immediately.

use crate::package::{PackageFile, PackageRecord};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Installed-package manifest bound to its file.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    file: PackageFile,
}

impl Manifest {
    /// Opens the manifest at `path`, creating an empty one when missing.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created, read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Creating manifest file at {}", path.display());
            PackageFile::default().save(path)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: PackageFile::load(path)?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn packages(&self) -> &[PackageRecord] {
        &self.file.packages
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.file.get(name)
    }

    /// Records an installed package, replacing any previous record of the
    /// same name, and saves.
    ///
    /// # Errors
    ///
    /// Fails if the manifest cannot be written.
    pub fn add_package(&mut self, record: &PackageRecord) -> Result<()> {
        let mut record = record.clone();
        record.touch();
        info!("Recording {} ({}) in manifest", record.name, record.version);
        self.file.upsert(record);
        self.file.save(&self.path)
    }

    /// Removes a package record and saves, returning the removed record.
    ///
    /// # Errors
    ///
    /// Fails if the manifest cannot be written.
    pub fn remove_package(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        let removed = self.file.remove(name);
        if let Some(record) = &removed {
            info!("Removing {} from manifest", record.name);
            self.file.save(&self.path)?;
        }
        Ok(removed)
    }
}
