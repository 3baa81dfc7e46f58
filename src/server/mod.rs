//! Package server abstraction.
//!
//! Published packages are stored as release pairs named after the package and
//! version: `<name>-<version>.zip` holding the files and `<name>-<version>.json`
//! holding the [`PackageRecord`] descriptor.
//!
//! [`RegistryServer`] is the only implementation: a directory on disk standing
//! in for the remote server at `host:port`. Pushing copies a release pair into
//! the directory, fetching reads it back.

use crate::core::SapError;
use crate::package::{PackageRecord, archive_file_name, descriptor_file_name};
use crate::utils::{ensure_dir, read_json_file};
use crate::version::{LooseVersion, VersionRequirement};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Operations the CLI needs from a package server.
pub trait PackageServer {
    /// `host:port` of the server, for messages.
    fn address(&self) -> String;

    /// Picks the greatest published version of `name` that satisfies
    /// `requirement` (any version when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`SapError::PackageNotFound`] when no release matches.
    fn resolve_version(&self, name: &str, requirement: Option<&VersionRequirement>) -> Result<String>;

    /// Reads the descriptor of one release.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::PackageNotFound`] when the release does not exist.
    fn fetch_descriptor(&self, name: &str, version: &str) -> Result<PackageRecord>;

    /// Local path of the archive of one release.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::PackageNotFound`] when the release does not exist.
    fn archive_path(&self, name: &str, version: &str) -> Result<PathBuf>;

    /// Publishes a release pair.
    ///
    /// # Errors
    ///
    /// Fails if either file cannot be stored.
    fn push(&self, record: &PackageRecord, archive: &Path, descriptor: &Path) -> Result<()>;

    /// Withdraws every published release of `name`, returning how many
    /// releases were removed.
    ///
    /// # Errors
    ///
    /// Fails if a release cannot be deleted.
    fn remove(&self, name: &str) -> Result<usize>;
}

/// Directory-backed package server.
#[derive(Debug, Clone)]
pub struct RegistryServer {
    host: String,
    port: u16,
    registry_dir: PathBuf,
}

impl RegistryServer {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, registry_dir: PathBuf) -> Self {
        Self {
            host: host.into(),
            port,
            registry_dir,
        }
    }

    #[must_use]
    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    /// All published versions of `name`, sorted by how they are written.
    fn published_versions(&self, name: &str) -> Result<Vec<LooseVersion>> {
        if !self.registry_dir.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{name}-");
        let mut versions = Vec::new();
        let entries = fs::read_dir(&self.registry_dir).with_context(|| {
            format!("Failed to read registry directory: {}", self.registry_dir.display())
        })?;

        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(version) =
                file_name.strip_prefix(&prefix).and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };
            // `<name>-other-1.0.json` belongs to a different package
            if let Ok(version) = LooseVersion::parse(version) {
                versions.push(version);
            }
        }

        versions.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(versions)
    }

    fn release_path(&self, file_name: &str, name: &str, version: &str) -> Result<PathBuf> {
        let path = self.registry_dir.join(file_name);
        if !path.is_file() {
            return Err(SapError::PackageNotFound {
                name: format!("{name} ({version})"),
            }
            .into());
        }
        Ok(path)
    }
}

impl PackageServer for RegistryServer {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn resolve_version(&self, name: &str, requirement: Option<&VersionRequirement>) -> Result<String> {
        let best = self
            .published_versions(name)?
            .into_iter()
            .filter(|candidate| requirement.is_none_or(|req| req.matches(candidate)))
            // Equal versions spelled differently ("1.2", "1.2.0") are ordered by their text
            .max_by(|a, b| a.cmp(b).then_with(|| a.as_str().cmp(b.as_str())));

        match best {
            Some(version) => {
                debug!("Resolved {} to {}", name, version);
                Ok(version.as_str().to_string())
            }
            None => Err(SapError::PackageNotFound {
                name: match requirement {
                    Some(req) => format!("{name}{req}"),
                    None => name.to_string(),
                },
            }
            .into()),
        }
    }

    fn fetch_descriptor(&self, name: &str, version: &str) -> Result<PackageRecord> {
        let path = self.release_path(&descriptor_file_name(name, version), name, version)?;
        let value: serde_json::Value = read_json_file(&path)?;
        PackageRecord::from_value(value)
            .with_context(|| format!("Invalid package descriptor: {}", path.display()))
    }

    fn archive_path(&self, name: &str, version: &str) -> Result<PathBuf> {
        self.release_path(&archive_file_name(name, version), name, version)
    }

    fn push(&self, record: &PackageRecord, archive: &Path, descriptor: &Path) -> Result<()> {
        info!("Pushing {} ({}) to {}", record.name, record.version, self.address());
        ensure_dir(&self.registry_dir)?;

        for (source, file_name) in [
            (archive, record.archive_file_name()),
            (descriptor, record.descriptor_file_name()),
        ] {
            let destination = self.registry_dir.join(file_name);
            fs::copy(source, &destination).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), destination.display())
            })?;
        }

        Ok(())
    }

    fn remove(&self, name: &str) -> Result<usize> {
        let versions = self.published_versions(name)?;
        for version in &versions {
            for file_name in
                [archive_file_name(name, version.as_str()), descriptor_file_name(name, version.as_str())]
            {
                let path = self.registry_dir.join(file_name);
                if path.is_file() {
                    fs::remove_file(&path)
                        .with_context(|| format!("Failed to remove {}", path.display()))?;
                }
            }
        }

        info!("Removed {} release(s) of {} from {}", versions.len(), name, self.address());
        Ok(versions.len())
    }
}
