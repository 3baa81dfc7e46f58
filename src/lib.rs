//! SAP - a small file package manager
//!
//! SAP turns a directory of files into versioned, publishable packages and
//! installs them into other projects. The heart of the crate is a pattern-based
//! file-selection engine: a package declares glob patterns, those patterns are
//! compiled to anchored regular expressions, and a deterministic directory walk
//! yields the files to archive.
//!
//! # Architecture Overview
//!
//! - A **source file** (`sap-source.json`) lists packages published from a
//!   project, each with a directory, patterns and a version
//! - Adding or updating a package builds a release pair next to the source
//!   file: `<name>-<version>.zip` and the `<name>-<version>.json` descriptor
//! - A **package server** stores release pairs and resolves version requirements
//! - A **target file** (`sap.json`) lists the packages a project installs, and
//!   the machine-wide **manifest** (`~/.sap/manifest.json`) records installed
//!   files so they can be removed later
//!
//! # Core Modules
//!
//! ## Selection Engine
//! - [`pattern`] - pattern compilation and the deterministic file walk
//! - [`archive`] - zip archive creation and extraction
//! - [`version`] - strict and loose versions, comparison and requirements
//!
//! ## Package Collections
//! - [`package`] - package records and JSON package files
//! - [`source`] - the source collection (`sap-source.json`)
//! - [`target`] - install targets (`sap.json`) and install planning
//! - [`manifest`] - the installed-package manifest
//! - [`server`] - the package server abstraction and its registry backend
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - global configuration and the sap directory
//! - [`core`] - error types and user-facing error formatting
//! - [`constants`] - file names and defaults
//! - [`utils`] - atomic file writes, JSON I/O and timestamps
//!
//! # Pattern Dialect
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `*` | any run of characters within one path segment |
//! | `**` | any run of characters, across `/` |
//! | anything else | itself, literally |
//!
//! Patterns match the whole relative path: `*.txt` selects `a.txt` but not
//! `sub/b.txt`, while `**.txt` selects both.
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Publish packages/demo as demo 0.0.1
//! sap source add demo packages/demo
//!
//! # Install the newest demo release into ./demo
//! sap save demo
//!
//! # Show what is installed
//! sap list
//! ```

// Selection engine
pub mod archive;
pub mod pattern;
pub mod version;

// Package collections
pub mod manifest;
pub mod package;
pub mod server;
pub mod source;
pub mod target;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
