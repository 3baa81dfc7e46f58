//! Error handling for SAP
//!
//! This module provides the error types and user-friendly error reporting for the
//! SAP package toolkit. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`SapError`] - Enumerated error types for every typed failure in SAP
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//!
//! The file-selection engine, the archive builder and the version comparer return
//! `Result<T, SapError>` directly so callers can match on the failure kind. The
//! package glue layers (`source`, `target`, `manifest`) use `anyhow::Result` and
//! attach context; [`user_friendly_error`] digs the [`SapError`] back out of the
//! chain when the CLI reports the failure.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sap_cli::core::{SapError, user_friendly_error};
//!
//! let error = SapError::EmptySelection {
//!     root: "pkg".to_string(),
//!     patterns: vec!["*.txt".to_string()],
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Convenience alias for results produced by the core engine.
pub type Result<T, E = SapError> = std::result::Result<T, E>;

/// The main error type for SAP operations
///
/// # Error Categories
///
/// ## File selection
/// - [`InvalidPattern`] - pattern input was not a list of strings, or did not compile
/// - [`EmptySelection`] - no file under the package root matched any pattern
/// - [`DirectoryNotFound`] - the package root does not exist
///
/// ## Archives
/// - [`ArchiveWrite`] - a selected file could not be read or the archive not written
/// - [`ArchiveRead`] - an archive is corrupt, unreadable, or has unsafe entry names
///
/// ## Versions
/// - [`InvalidVersion`] - malformed version string
///
/// ## Packages
/// - [`PackageNotFound`], [`PackageExists`], [`AbsolutePackagePath`], [`InvalidPackageFile`]
///
/// [`InvalidPattern`]: SapError::InvalidPattern
/// [`EmptySelection`]: SapError::EmptySelection
/// [`DirectoryNotFound`]: SapError::DirectoryNotFound
/// [`ArchiveWrite`]: SapError::ArchiveWrite
/// [`ArchiveRead`]: SapError::ArchiveRead
/// [`InvalidVersion`]: SapError::InvalidVersion
/// [`PackageNotFound`]: SapError::PackageNotFound
/// [`PackageExists`]: SapError::PackageExists
/// [`AbsolutePackagePath`]: SapError::AbsolutePackagePath
/// [`InvalidPackageFile`]: SapError::InvalidPackageFile
#[derive(Error, Debug)]
pub enum SapError {
    /// Pattern input could not be turned into matchers.
    #[error("Invalid pattern: {reason}")]
    InvalidPattern {
        reason: String,
    },

    /// No file under the package root matched any pattern.
    ///
    /// A package must contain at least one file.
    #[error("No files in '{root}' match patterns {patterns:?}")]
    EmptySelection {
        root: String,
        patterns: Vec<String>,
    },

    #[error("Package directory not found: {path}")]
    DirectoryNotFound {
        path: String,
    },

    /// Packing a file selection into an archive failed.
    #[error("Failed to write archive '{path}': {reason}")]
    ArchiveWrite {
        path: String,
        reason: String,
    },

    /// Unpacking an archive failed.
    #[error("Failed to read archive '{path}': {reason}")]
    ArchiveRead {
        path: String,
        reason: String,
    },

    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        version: String,
        reason: String,
    },

    #[error("Package '{name}' not found")]
    PackageNotFound {
        name: String,
    },

    #[error("Package '{name}' already exists")]
    PackageExists {
        name: String,
    },

    /// Package paths are stored relative to the source or target file directory.
    #[error("Package path must be relative: {path}")]
    AbsolutePackagePath {
        path: String,
    },

    #[error("Invalid package file '{file}': {reason}")]
    InvalidPackageFile {
        file: String,
        reason: String,
    },

    #[error("File system error: {operation} on {path}")]
    FileSystemError {
        operation: String,
        path: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SapError {
    /// Builds an [`SapError::ArchiveWrite`] for `path` from any displayable cause.
    pub(crate) fn archive_write(path: &Path, reason: impl fmt::Display) -> Self {
        Self::ArchiveWrite {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Builds an [`SapError::ArchiveRead`] for `path` from any displayable cause.
    pub(crate) fn archive_read(path: &Path, reason: impl fmt::Display) -> Self {
        Self::ArchiveRead {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Error wrapper carrying the message shown to the user plus optional guidance.
///
/// # Examples
///
/// ```rust,no_run
/// use sap_cli::core::ErrorContext;
///
/// let context = ErrorContext::new("Package 'demo' not found")
///     .with_suggestion("Run 'sap source add demo <path>' first")
///     .with_details("Packages are looked up by their cleaned, lower-case name");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The error message, including any context attached along the way
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] with suggestions where SAP knows
/// how the failure is usually fixed.
///
/// The full context chain is kept as the message; the innermost [`SapError`],
/// if any, selects the suggestion.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    if let Some(sap_error) = error.downcast_ref::<SapError>() {
        return create_error_context(sap_error, message);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorContext::new(message)
                .with_suggestion("Check file ownership and permissions for the paths involved"),
            std::io::ErrorKind::NotFound => ErrorContext::new(message)
                .with_suggestion("Check that the file or directory exists and the path is correct"),
            _ => ErrorContext::new(message),
        };
    }

    ErrorContext::new(message)
}

fn create_error_context(error: &SapError, message: String) -> ErrorContext {
    match error {
        SapError::InvalidPattern { .. } => ErrorContext::new(message)
            .with_suggestion("Patterns must be a JSON list of strings, e.g. [\"**\"] or [\"docs/*.md\"]"),

        SapError::EmptySelection { .. } => ErrorContext::new(message)
            .with_suggestion("Use '**' to cross directory boundaries, e.g. '**/*.txt' or 'assets/**'")
            .with_details("'*' matches within a single path segment and never matches '/'; a package must contain at least one file"),

        SapError::DirectoryNotFound { .. } => ErrorContext::new(message)
            .with_suggestion("Package paths are relative to the directory containing the source file"),

        SapError::ArchiveRead { .. } => ErrorContext::new(message)
            .with_suggestion("Push the package again to regenerate its archive"),

        SapError::InvalidVersion { .. } => ErrorContext::new(message)
            .with_suggestion("Versions are dotted integers such as 1.2.3"),

        SapError::PackageNotFound { name } => ErrorContext::new(message)
            .with_suggestion(format!("Did you mean 'sap source add {name} <path>'?")),

        SapError::PackageExists { name } => ErrorContext::new(message)
            .with_suggestion(format!("Use 'sap source update {name}' to change an existing package")),

        SapError::AbsolutePackagePath { .. } => ErrorContext::new(message)
            .with_suggestion("Give the package path relative to the source or target file directory"),

        SapError::InvalidPackageFile { .. } => ErrorContext::new(message)
            .with_details("Package files hold a top-level \"packages\" list of package records"),

        _ => ErrorContext::new(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_context_display_includes_details_and_suggestion() {
        let ctx = ErrorContext::new("boom").with_details("why").with_suggestion("fix it");
        let rendered = ctx.to_string();
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("Details: why"));
        assert!(rendered.contains("Suggestion: fix it"));
    }

    #[test]
    fn test_user_friendly_error_finds_sap_error_through_context() {
        let result: anyhow::Result<()> = Err(SapError::EmptySelection {
            root: "pkg".to_string(),
            patterns: vec!["*.png".to_string()],
        })
        .context("Failed to add package 'demo'");

        let ctx = user_friendly_error(result.unwrap_err());
        assert!(ctx.message.starts_with("Failed to add package 'demo'"));
        assert!(ctx.message.contains("*.png"));
        assert!(ctx.suggestion.unwrap().contains("**"));
    }

    #[test]
    fn test_user_friendly_error_for_plain_error() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert_eq!(ctx.message, "something odd");
        assert!(ctx.suggestion.is_none());
    }
}
