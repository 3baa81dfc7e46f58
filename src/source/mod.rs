//! The source collection: packages published from this project.
//!
//! A source file (`sap-source.json` by default) lists the packages whose files
//! live below the file's directory. Adding or updating a package resolves its
//! file selection, builds the release pair next to the source file and, unless
//! working locally, pushes the pair to a [`PackageServer`]:
//!
//! ```text
//! project/
//! ├── sap-source.json
//! ├── demo-0.0.1.zip      # archive of the selected files
//! ├── demo-0.0.1.json     # descriptor (the package record)
//! └── packages/demo/...   # package directory, `path` in the record
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use sap_cli::source::{PackageRequest, SourceCollection};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut source = SourceCollection::create(Path::new("sap-source.json"))?;
//! let request = PackageRequest::new("demo").with_path("packages/demo");
//! source.add(&request, None)?;
//! # Ok(())
//! # }
//! ```

use crate::archive::build_archive;
use crate::constants::{DEFAULT_PATTERN, DEFAULT_VERSION};
use crate::core::SapError;
use crate::package::{PackageFile, PackageRecord, clean_package_name};
use crate::pattern::select_files;
use crate::server::PackageServer;
use crate::utils::write_json_file;
use crate::version::{LooseVersion, Version};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fields supplied when adding or updating a source package.
///
/// Fields left empty keep their current value on update and take their
/// defaults on add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRequest {
    pub name: String,
    pub path: Option<String>,
    pub patterns: Vec<String>,
    pub version: Option<String>,
}

impl PackageRequest {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: clean_package_name(name),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }
}

/// Source packages bound to their source file.
#[derive(Debug)]
pub struct SourceCollection {
    path: PathBuf,
    root: PathBuf,
    file: PackageFile,
}

impl SourceCollection {
    /// Creates an empty source file at `path` and opens it.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn create(path: &Path) -> Result<Self> {
        info!("Creating source file at {}", path.display());
        PackageFile::default().save(path)?;
        Self::load(path)
    }

    /// Opens an existing source file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds an invalid package record.
    pub fn load(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve source file path: {}", path.display()))?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let file = PackageFile::load(&path)?;
        debug!("Loaded {} source package(s) from {}", file.packages.len(), path.display());

        Ok(Self {
            path,
            root,
            file,
        })
    }

    /// Opens `path`, creating it first when `create` is true and it is missing.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing and `create` is false, or on any load error.
    pub fn open(path: &Path, create: bool) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else if create {
            Self::create(path)
        } else {
            anyhow::bail!("Source file not found: {}", path.display())
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory package paths and release artifacts are relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn packages(&self) -> &[PackageRecord] {
        &self.file.packages
    }

    #[must_use]
    pub fn package_names(&self) -> Vec<String> {
        self.file.names()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.file.get(name)
    }

    /// Location of the archive built for `record`.
    #[must_use]
    pub fn archive_path(&self, record: &PackageRecord) -> PathBuf {
        self.root.join(record.archive_file_name())
    }

    /// Location of the descriptor written for `record`.
    #[must_use]
    pub fn descriptor_path(&self, record: &PackageRecord) -> PathBuf {
        self.root.join(record.descriptor_file_name())
    }

    /// Adds a new package, builds its release pair and pushes it to `server`
    /// when one is given.
    ///
    /// # Errors
    ///
    /// - [`SapError::PackageExists`] if the name is already in the collection
    /// - [`SapError::AbsolutePackagePath`], [`SapError::DirectoryNotFound`] or
    ///   [`SapError::EmptySelection`] for an unusable package directory
    /// - [`SapError::InvalidVersion`] for a malformed version
    /// - any error writing artifacts, saving or pushing
    pub fn add(
        &mut self,
        request: &PackageRequest,
        server: Option<&dyn PackageServer>,
    ) -> Result<PackageRecord> {
        let name = clean_package_name(&request.name);
        if self.file.contains(&name) {
            return Err(SapError::PackageExists {
                name,
            }
            .into());
        }
        info!("Adding package {}", name);

        let path = request.path.as_deref().unwrap_or_default();
        let version = request.version.as_deref().unwrap_or(DEFAULT_VERSION);
        LooseVersion::parse(version)?;
        let patterns = if request.patterns.is_empty() {
            vec![DEFAULT_PATTERN.to_string()]
        } else {
            request.patterns.clone()
        };

        let record = PackageRecord::new(&name, version, path, patterns);
        self.publish(record, server)
    }

    /// Updates an existing package and rebuilds its release pair.
    ///
    /// Path and patterns are replaced when the request supplies them. Without
    /// an explicit version the patch component is bumped.
    ///
    /// # Errors
    ///
    /// - [`SapError::PackageNotFound`] if the name is not in the collection
    /// - [`SapError::InvalidVersion`] if the version is malformed or the
    ///   current version cannot be bumped
    /// - the same selection and artifact errors as [`SourceCollection::add`]
    pub fn update(
        &mut self,
        request: &PackageRequest,
        server: Option<&dyn PackageServer>,
    ) -> Result<PackageRecord> {
        let name = clean_package_name(&request.name);
        let mut record = self.get(&name).cloned().ok_or_else(|| SapError::PackageNotFound {
            name: name.clone(),
        })?;
        info!("Updating package {}", name);

        if let Some(path) = &request.path {
            record.path = crate::pattern::normalize_relative_path(path);
        }
        if !request.patterns.is_empty() {
            record.patterns = request.patterns.clone();
        }
        record.version = match &request.version {
            Some(version) => {
                LooseVersion::parse(version)?;
                version.trim().to_string()
            }
            None => record.version.parse::<Version>()?.next_patch()?.to_string(),
        };
        record.touch();

        self.publish(record, server)
    }

    /// Removes a package from the collection and saves, returning the removed
    /// record. Published releases are left in place.
    ///
    /// # Errors
    ///
    /// Fails if the source file cannot be written.
    pub fn remove(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        let removed = self.file.remove(name);
        match &removed {
            Some(record) => {
                info!("Removing package {}", record.name);
                self.save()?;
            }
            None => debug!("Package {} is not in the source file", clean_package_name(name)),
        }
        Ok(removed)
    }

    /// Pushes the current release pair of a package, rebuilding it first if
    /// either artifact is missing.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::PackageNotFound`] for an unknown name, or any
    /// rebuild or push error.
    pub fn push(&self, name: &str, server: &dyn PackageServer) -> Result<()> {
        let mut record = self.get(name).cloned().ok_or_else(|| SapError::PackageNotFound {
            name: clean_package_name(name),
        })?;

        if !self.archive_path(&record).is_file() || !self.descriptor_path(&record).is_file() {
            debug!("Release artifacts for {} missing, rebuilding", record.name);
            self.build_artifacts(&mut record)?;
        }

        server.push(&record, &self.archive_path(&record), &self.descriptor_path(&record))
    }

    /// Writes the source file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        info!("Saving source file to {}", self.path.display());
        self.file.save(&self.path)
    }

    /// Builds artifacts for `record`, stores it, saves and optionally pushes.
    fn publish(
        &mut self,
        mut record: PackageRecord,
        server: Option<&dyn PackageServer>,
    ) -> Result<PackageRecord> {
        record.verify()?;
        self.build_artifacts(&mut record)?;

        self.file.upsert(record.clone());
        self.save()?;

        if let Some(server) = server {
            server.push(&record, &self.archive_path(&record), &self.descriptor_path(&record))?;
        }
        Ok(record)
    }

    /// Resolves the file selection into `record.files` and writes the archive
    /// and descriptor beside the source file.
    fn build_artifacts(&self, record: &mut PackageRecord) -> Result<()> {
        let package_dir = self.root.join(&record.path);
        record.files = select_files(&package_dir, &record.patterns)?;
        debug!("Selected {} file(s) for {}", record.files.len(), record.name);

        build_archive(&self.archive_path(record), &package_dir, &record.files)?;
        write_json_file(&self.descriptor_path(record), record)
    }
}
