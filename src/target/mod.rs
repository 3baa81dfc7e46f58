//! Install targets: projects that consume packages.
//!
//! A target file (`sap.json` by default) lists the packages a project wants,
//! each with the directory it is installed into (relative to the target file).
//! Installing a package fetches its archive from a [`PackageServer`] through
//! the cache directory, extracts it and records it in both the target file and
//! the machine-wide [`Manifest`].

use crate::archive::{archive_entries, extract_archive};
use crate::config::{cache_dir, manifest_path};
use crate::manifest::Manifest;
use crate::package::{PackageFile, PackageRecord, clean_package_name};
use crate::pattern::normalize_relative_path;
use crate::server::PackageServer;
use crate::utils::ensure_dir;
use crate::version::compare_versions;
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// What installing a package would do given what is already installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallPlan {
    /// Not installed yet
    Fresh,
    /// Same version already installed
    Reinstall,
    Upgrade {
        from: String,
    },
    /// An older version would replace a newer one
    Downgrade {
        from: String,
    },
}

impl InstallPlan {
    /// Compares the installed record (if any) with the incoming one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::SapError::InvalidVersion`] if either version is
    /// malformed.
    pub fn for_package(installed: Option<&PackageRecord>, incoming: &PackageRecord) -> Result<Self> {
        let Some(installed) = installed else {
            return Ok(Self::Fresh);
        };

        let from = installed.version.clone();
        Ok(match compare_versions(&installed.version, &incoming.version)? {
            Ordering::Equal => Self::Reinstall,
            Ordering::Less => Self::Upgrade {
                from,
            },
            Ordering::Greater => Self::Downgrade {
                from,
            },
        })
    }

    /// Only downgrades ask the user first.
    #[must_use]
    pub const fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Downgrade { .. })
    }
}

/// A target file together with the manifest and cache it installs through.
#[derive(Debug)]
pub struct Target {
    path: PathBuf,
    root: PathBuf,
    cache_dir: PathBuf,
    file: PackageFile,
    manifest: Manifest,
}

impl Target {
    /// Opens the target file, creating it, the sap directory and its cache
    /// directory when missing.
    ///
    /// # Errors
    ///
    /// Fails if any of them cannot be created, or the target file or manifest
    /// cannot be loaded.
    pub fn open(target_file: &Path, sap_dir: &Path) -> Result<Self> {
        if !sap_dir.exists() {
            info!("Making sap directory at {}", sap_dir.display());
        }
        ensure_dir(sap_dir)?;
        let cache_dir = cache_dir(sap_dir);
        ensure_dir(&cache_dir)?;

        let path = std::path::absolute(target_file).with_context(|| {
            format!("Failed to resolve target file path: {}", target_file.display())
        })?;
        if !path.exists() {
            info!("Creating target file at {}", path.display());
            PackageFile::default().save(&path)?;
        }

        Ok(Self {
            root: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            file: PackageFile::load(&path)?,
            manifest: Manifest::open(&manifest_path(sap_dir))?,
            cache_dir,
            path,
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

    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// How installing `incoming` would relate to the installed version.
    ///
    /// # Errors
    ///
    /// Fails if either version is malformed.
    pub fn plan(&self, incoming: &PackageRecord) -> Result<InstallPlan> {
        InstallPlan::for_package(self.manifest.get(&incoming.name), incoming)
    }

    /// Installs one release of a package.
    ///
    /// `output_dir` is relative to the target file's directory and defaults to
    /// the package name. The archive is cached and its entries checked before
    /// a previously installed version is uninstalled, so a release that cannot
    /// be fetched leaves the existing install in place. The manifest records
    /// the files actually extracted.
    ///
    /// # Errors
    ///
    /// Fails if the archive cannot be fetched or extracted, or either package
    /// file cannot be written.
    pub fn install(
        &mut self,
        record: &PackageRecord,
        output_dir: Option<&str>,
        server: &dyn PackageServer,
    ) -> Result<PackageRecord> {
        let mut record = record.clone();
        record.path = normalize_relative_path(output_dir.unwrap_or(&record.name));
        record.verify()?;

        info!("Downloading {} ({}) from {}", record.name, record.version, server.address());
        let archive = server.archive_path(&record.name, &record.version)?;
        let cached = self.cache_dir.join(record.archive_file_name());
        fs::copy(&archive, &cached)
            .with_context(|| format!("Failed to cache {}", archive.display()))?;
        let entries = archive_entries(&cached)?;

        if self.manifest.get(&record.name).is_some() {
            self.remove_installed_files(&record.name)?;
        }

        let install_dir = self.root.join(&record.path);
        ensure_dir(&install_dir)?;
        extract_archive(&cached, &install_dir)?;
        debug!("Extracted {} file(s) into {}", entries.len(), install_dir.display());
        record.files = entries;

        // The manifest is machine-wide, so it records where the files went
        let mut installed = record.clone();
        installed.path = install_dir.display().to_string();
        self.manifest.add_package(&installed)?;

        record.touch();
        self.file.upsert(record.clone());
        self.save()?;
        Ok(record)
    }

    /// Deletes the installed files of a package and drops it from the
    /// manifest and the target file.
    ///
    /// Returns the removed record, or `None` if the package was neither
    /// installed nor listed.
    ///
    /// # Errors
    ///
    /// Fails if a file cannot be deleted or either package file cannot be
    /// written.
    pub fn uninstall(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        let name = clean_package_name(name);
        let installed = self.remove_installed_files(&name)?;

        let listed = self.file.remove(&name);
        if listed.is_some() {
            self.save()?;
        }
        Ok(listed.or(installed))
    }

    /// Writes the target file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        info!("Saving target file to {}", self.path.display());
        self.file.save(&self.path)
    }

    fn remove_installed_files(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        let Some(installed) = self.manifest.remove_package(name)? else {
            return Ok(None);
        };

        let install_dir = PathBuf::from(&installed.path);
        let mut removed = Vec::new();
        for file in &installed.files {
            let Some(path) = installed_file_path(&install_dir, file) else {
                warn!("Skipping '{}': not a path inside {}", file, install_dir.display());
                continue;
            };
            if path.is_file() {
                debug!("Removing {}", path.display());
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                removed.push(path);
            }
        }

        for path in &removed {
            prune_empty_parents(path, &install_dir, &self.root);
        }
        if install_dir.is_dir() && install_dir != self.root && !removed.is_empty() {
            warn!(
                "Leaving {} in place: it holds files not installed by sap",
                install_dir.display()
            );
        }

        Ok(Some(installed))
    }
}

/// Joins a recorded file onto the install directory, or `None` when the entry
/// is absolute or climbs out with `..`.
fn installed_file_path(install_dir: &Path, file: &str) -> Option<PathBuf> {
    let relative = Path::new(file);
    let contained = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    (contained && !file.is_empty()).then(|| install_dir.join(relative))
}

/// Removes the directories above a deleted file while they are empty, up to
/// and including `install_dir`. `keep` (the project root) is never removed.
fn prune_empty_parents(file: &Path, install_dir: &Path, keep: &Path) {
    let mut dir = file.parent();
    while let Some(current) = dir {
        if !current.starts_with(install_dir) || current == keep {
            break;
        }
        if fs::remove_dir(current).is_err() {
            break;
        }
        debug!("Removed empty directory {}", current.display());
        if current == install_dir {
            break;
        }
        dir = current.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::RegistryServer;
    use crate::source::{PackageRequest, SourceCollection};
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _temp: TempDir,
        project: PathBuf,
        sap_dir: PathBuf,
        server: RegistryServer,
    }

    /// Publishes `demo` at each version with one file named after the version.
    fn fixture(versions: &[&str]) -> Fixture {
        let temp = tempdir().unwrap();
        let publisher = temp.path().join("publisher");
        let pkg = publisher.join("pkg");
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::write(pkg.join("sub/common.txt"), "common").unwrap();

        let server = RegistryServer::new("localhost", 8080, temp.path().join("registry"));
        let mut source = SourceCollection::create(&publisher.join("sap-source.json")).unwrap();
        for (i, version) in versions.iter().enumerate() {
            fs::write(pkg.join("version.txt"), version).unwrap();
            let request = PackageRequest::new("demo")
                .with_path("pkg")
                .with_version(Some((*version).to_string()));
            if i == 0 {
                source.add(&request, Some(&server)).unwrap();
            } else {
                source.update(&request, Some(&server)).unwrap();
            }
        }

        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        Fixture {
            sap_dir: temp.path().join("home/.sap"),
            project,
            server,
            _temp: temp,
        }
    }

    fn incoming(version: &str) -> PackageRecord {
        PackageRecord::new("demo", version, "demo", Vec::new())
    }

    #[test]
    fn test_install_plan() {
        let installed = incoming("1.2.0");
        assert_eq!(InstallPlan::for_package(None, &installed).unwrap(), InstallPlan::Fresh);
        assert_eq!(
            InstallPlan::for_package(Some(&installed), &incoming("1.2")).unwrap(),
            InstallPlan::Reinstall
        );

        let plan = InstallPlan::for_package(Some(&installed), &incoming("1.10.0")).unwrap();
        assert_eq!(plan, InstallPlan::Upgrade { from: "1.2.0".to_string() });
        assert!(!plan.requires_confirmation());

        let plan = InstallPlan::for_package(Some(&installed), &incoming("1.1.9")).unwrap();
        assert!(plan.requires_confirmation());
    }

    #[test]
    fn test_open_creates_layout() {
        let fixture = fixture(&["0.0.1"]);
        let target_file = fixture.project.join("sap.json");
        let target = Target::open(&target_file, &fixture.sap_dir).unwrap();

        assert!(target_file.is_file());
        assert!(fixture.sap_dir.join("cache").is_dir());
        assert!(fixture.sap_dir.join("manifest.json").is_file());
        assert!(target.packages().is_empty());
    }

    #[test]
    fn test_install_and_uninstall() {
        let fixture = fixture(&["0.0.1"]);
        let target_file = fixture.project.join("sap.json");
        let mut target = Target::open(&target_file, &fixture.sap_dir).unwrap();

        let descriptor = fixture.server.fetch_descriptor("demo", "0.0.1").unwrap();
        let record = target.install(&descriptor, None, &fixture.server).unwrap();
        assert_eq!(record.path, "demo");

        let installed = fixture.project.join("demo");
        assert_eq!(fs::read_to_string(installed.join("version.txt")).unwrap(), "0.0.1");
        assert!(installed.join("sub/common.txt").is_file());
        assert!(fixture.sap_dir.join("cache/demo-0.0.1.zip").is_file());

        let reopened = Target::open(&target_file, &fixture.sap_dir).unwrap();
        assert_eq!(reopened.get("demo").unwrap().version, "0.0.1");
        assert_eq!(reopened.manifest().get("demo").unwrap().files.len(), 2);

        let mut target = reopened;
        assert!(target.uninstall("demo").unwrap().is_some());
        assert!(!installed.exists());
        assert!(target.get("demo").is_none());
        assert!(target.manifest().get("demo").is_none());
        assert!(target.uninstall("demo").unwrap().is_none());
    }

    #[test]
    fn test_install_into_custom_dir_replaces_previous_version() {
        let fixture = fixture(&["1.0.0", "2.0.0"]);
        let mut target = Target::open(&fixture.project.join("sap.json"), &fixture.sap_dir).unwrap();

        let newer = fixture.server.fetch_descriptor("demo", "2.0.0").unwrap();
        target.install(&newer, Some("vendor/demo"), &fixture.server).unwrap();

        let older = fixture.server.fetch_descriptor("demo", "1.0.0").unwrap();
        assert!(target.plan(&older).unwrap().requires_confirmation());
        target.install(&older, Some("libs/demo"), &fixture.server).unwrap();

        assert!(!fixture.project.join("vendor/demo").exists());
        let version = fs::read_to_string(fixture.project.join("libs/demo/version.txt")).unwrap();
        assert_eq!(version, "1.0.0");
        assert_eq!(target.packages().len(), 1);
        assert_eq!(target.get("demo").unwrap().path, "libs/demo");
    }

    #[test]
    fn test_uninstall_keeps_foreign_files() {
        let fixture = fixture(&["0.0.1"]);
        let mut target = Target::open(&fixture.project.join("sap.json"), &fixture.sap_dir).unwrap();
        let descriptor = fixture.server.fetch_descriptor("demo", "0.0.1").unwrap();
        target.install(&descriptor, None, &fixture.server).unwrap();

        let foreign = fixture.project.join("demo/notes.md");
        fs::write(&foreign, "mine").unwrap();
        target.uninstall("demo").unwrap();

        assert!(foreign.is_file());
        assert!(!fixture.project.join("demo/version.txt").exists());
        assert!(!fixture.project.join("demo/sub").exists());
    }

    #[test]
    fn test_failed_install_keeps_previous_version() {
        let fixture = fixture(&["0.0.1", "0.0.2"]);
        let target_file = fixture.project.join("sap.json");
        let mut target = Target::open(&target_file, &fixture.sap_dir).unwrap();
        let older = fixture.server.fetch_descriptor("demo", "0.0.1").unwrap();
        target.install(&older, None, &fixture.server).unwrap();

        let newer = fixture.server.fetch_descriptor("demo", "0.0.2").unwrap();
        let registry = fixture.server.registry_dir().to_path_buf();
        fs::remove_file(registry.join("demo-0.0.2.zip")).unwrap();
        assert!(target.install(&newer, None, &fixture.server).is_err());

        fs::write(registry.join("demo-0.0.2.zip"), b"not a zip").unwrap();
        assert!(target.install(&newer, None, &fixture.server).is_err());

        let marker = fixture.project.join("demo/version.txt");
        assert_eq!(fs::read_to_string(marker).unwrap(), "0.0.1");
        assert_eq!(target.manifest().get("demo").unwrap().version, "0.0.1");

        let reopened = Target::open(&target_file, &fixture.sap_dir).unwrap();
        assert_eq!(reopened.get("demo").unwrap().version, "0.0.1");
        assert_eq!(reopened.manifest().get("demo").unwrap().version, "0.0.1");
    }

    #[test]
    fn test_uninstall_never_leaves_install_dir() {
        let fixture = fixture(&["0.0.1"]);
        let mut target = Target::open(&fixture.project.join("sap.json"), &fixture.sap_dir).unwrap();

        let victim = fixture.project.join("victim.txt");
        fs::write(&victim, "keep me").unwrap();
        let outside = fixture.project.join("outside.txt");
        fs::write(&outside, "keep me too").unwrap();

        // Descriptor files are not trusted; the archive's entries are recorded
        let mut descriptor = fixture.server.fetch_descriptor("demo", "0.0.1").unwrap();
        descriptor.files.push("../victim.txt".to_string());
        target.install(&descriptor, None, &fixture.server).unwrap();
        let mut recorded = target.manifest().get("demo").unwrap().clone();
        assert!(!recorded.files.contains(&"../victim.txt".to_string()));

        // A manifest edited by hand is guarded at removal time
        recorded.files.push("../victim.txt".to_string());
        recorded.files.push(outside.display().to_string());
        target.manifest.add_package(&recorded).unwrap();

        target.uninstall("demo").unwrap();
        assert!(victim.is_file());
        assert!(outside.is_file());
        assert!(!fixture.project.join("demo").exists());
    }

    #[test]
    fn test_uninstall_from_project_root_keeps_unrelated_dirs() {
        let fixture = fixture(&["0.0.1"]);
        let target_file = fixture.project.join("sap.json");
        let mut target = Target::open(&target_file, &fixture.sap_dir).unwrap();
        fs::create_dir_all(fixture.project.join("build/empty")).unwrap();

        let descriptor = fixture.server.fetch_descriptor("demo", "0.0.1").unwrap();
        target.install(&descriptor, Some("."), &fixture.server).unwrap();
        assert!(fixture.project.join("sub/common.txt").is_file());

        target.uninstall("demo").unwrap();
        assert!(!fixture.project.join("version.txt").exists());
        assert!(!fixture.project.join("sub").exists());
        assert!(fixture.project.join("build/empty").is_dir());
        assert!(target_file.is_file());
    }
}
