//! Package records and the JSON package files that hold them.
//!
//! The same record shape is used everywhere a package is persisted:
//!
//! - the source collection (`sap-source.json`), one record per published package
//! - the install target (`sap.json`), one record per package the project wants
//! - the installed manifest (`~/.sap/manifest.json`)
//! - per-release descriptors (`<name>-<version>.json`), holding a single record
//!
//! ```json
//! {
//!   "packages": [
//!     {
//!       "name": "demo-package",
//!       "version": "0.0.1",
//!       "path": "packages/demo",
//!       "modified": "2024-01-01 12:00:00",
//!       "created": "2024-01-01 12:00:00",
//!       "patterns": ["**"],
//!       "files": ["a.txt", "sub/b.txt"]
//!     }
//!   ]
//! }
//! ```

use crate::core::SapError;
use crate::pattern::{FileSelection, normalize_relative_path, patterns_from_value};
use crate::utils::{read_json_file, timestamp, write_json_file};
use crate::version::{RequirementOp, VersionRequirement};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Normalizes a package name: trimmed, lower-cased, spaces replaced by hyphens.
///
/// # Examples
///
/// ```rust,no_run
/// use sap_cli::package::clean_package_name;
///
/// assert_eq!(clean_package_name("  My Package "), "my-package");
/// ```
#[must_use]
pub fn clean_package_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// File name stem shared by a release's archive and descriptor.
#[must_use]
pub fn artifact_stem(name: &str, version: &str) -> String {
    format!("{name}-{version}")
}

/// File name of a release archive, e.g. `demo-0.0.1.zip`.
#[must_use]
pub fn archive_file_name(name: &str, version: &str) -> String {
    format!("{}.zip", artifact_stem(name, version))
}

/// File name of a release descriptor, e.g. `demo-0.0.1.json`.
#[must_use]
pub fn descriptor_file_name(name: &str, version: &str) -> String {
    format!("{}.json", artifact_stem(name, version))
}

/// One package as persisted in a package file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    /// Package directory, relative to the directory of the file holding the record
    pub path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modified: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub files: FileSelection,
}

/// Reads a timestamp that may be `null`; empty values are filled in later.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PackageRecord {
    /// Creates a record stamped with the current time and no resolved files.
    pub fn new(name: &str, version: &str, path: &str, patterns: Vec<String>) -> Self {
        let now = timestamp();
        Self {
            name: clean_package_name(name),
            version: version.trim().to_string(),
            path: normalize_relative_path(path),
            modified: now.clone(),
            created: now,
            patterns,
            files: Vec::new(),
        }
    }

    /// Parses a record from untyped JSON.
    ///
    /// The `patterns` field is validated separately so a malformed pattern list
    /// is reported as [`SapError::InvalidPattern`]. Missing or `null` timestamps are filled
    /// with the current time and the name is cleaned.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::InvalidPattern`] for a bad pattern list, or
    /// [`SapError::Json`] when required fields are missing or mistyped.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SapError> {
        let mut value = value;
        let patterns = match value.as_object_mut() {
            Some(object) => {
                let raw = object.remove("patterns").unwrap_or(serde_json::Value::Null);
                patterns_from_value(&raw)?
            }
            None => Vec::new(),
        };

        let mut record: Self = serde_json::from_value(value)?;
        record.name = clean_package_name(&record.name);
        record.patterns = patterns;

        if record.modified.is_empty() || record.created.is_empty() {
            let now = timestamp();
            if record.modified.is_empty() {
                record.modified.clone_from(&now);
            }
            if record.created.is_empty() {
                record.created = now;
            }
        }

        Ok(record)
    }

    /// Checks that the package path is relative.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::AbsolutePackagePath`] for absolute paths.
    pub fn verify(&self) -> Result<(), SapError> {
        if Path::new(&self.path).is_absolute() || self.path.starts_with('/') {
            return Err(SapError::AbsolutePackagePath {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// Refreshes the `modified` timestamp.
    pub fn touch(&mut self) {
        self.modified = timestamp();
    }

    #[must_use]
    pub fn archive_file_name(&self) -> String {
        archive_file_name(&self.name, &self.version)
    }

    #[must_use]
    pub fn descriptor_file_name(&self) -> String {
        descriptor_file_name(&self.name, &self.version)
    }
}

/// The JSON container holding a list of package records.
///
/// Each instance owns its own list; nothing is shared between files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageFile {
    pub packages: Vec<PackageRecord>,
}

impl PackageFile {
    /// Loads a package file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not an object with a `packages`
    /// list, or holds an invalid record.
    pub fn load(path: &Path) -> Result<Self> {
        let value: serde_json::Value = read_json_file(path)?;
        let invalid = |reason: &str| SapError::InvalidPackageFile {
            file: path.display().to_string(),
            reason: reason.to_string(),
        };

        let entries = match value {
            serde_json::Value::Object(mut object) => match object.remove("packages") {
                Some(serde_json::Value::Array(entries)) => entries,
                Some(_) => return Err(invalid("\"packages\" must be a list").into()),
                None => return Err(invalid("missing \"packages\" list").into()),
            },
            _ => return Err(invalid("expected a JSON object").into()),
        };

        let packages = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                PackageRecord::from_value(entry).with_context(|| {
                    format!("Invalid package entry #{} in {}", index + 1, path.display())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            packages,
        })
    }

    /// Writes the package file atomically.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self)
    }

    /// Looks up a package by name. The name is cleaned before comparison.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        let name = clean_package_name(name);
        self.packages.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    /// Inserts `record`, replacing a record of the same name in place.
    ///
    /// Returns the replaced record, if any.
    pub fn upsert(&mut self, record: PackageRecord) -> Option<PackageRecord> {
        match self.packages.iter_mut().find(|p| p.name == record.name) {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.packages.push(record);
                None
            }
        }
    }

    /// Removes a package by name, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<PackageRecord> {
        let name = clean_package_name(name);
        let index = self.packages.iter().position(|p| p.name == name)?;
        Some(self.packages.remove(index))
    }
}

/// A package name with an optional version requirement, as typed by users.
///
/// `demo>=1.2` selects the newest `demo` release at or above 1.2; a bare
/// `demo` selects the newest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub requirement: Option<VersionRequirement>,
}

impl PackageSpec {
    /// Splits a specification on the first operator found, trying `>=`, `<=`,
    /// `==` and `!=` in that order.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::InvalidVersion`] if the version after the operator is
    /// malformed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sap_cli::package::PackageSpec;
    ///
    /// let spec = PackageSpec::parse("My Lib>=1.2").unwrap();
    /// assert_eq!(spec.name, "my-lib");
    /// assert_eq!(spec.requirement.unwrap().to_string(), ">=1.2");
    /// ```
    pub fn parse(spec: &str) -> Result<Self, SapError> {
        for op in RequirementOp::ALL {
            if let Some((name, version)) = spec.split_once(op.as_str()) {
                return Ok(Self {
                    name: clean_package_name(name),
                    requirement: Some(VersionRequirement::new(op, version)?),
                });
            }
        }

        Ok(Self {
            name: clean_package_name(spec),
            requirement: None,
        })
    }
}
