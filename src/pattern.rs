//! Pattern-based file selection for SAP packages.
//!
//! A package is described by a directory and a list of glob-like patterns. This
//! module compiles those patterns into anchored matchers and walks the package
//! directory once, producing the package's file selection.
//!
//! # Pattern Syntax
//!
//! SAP uses a deliberately small glob dialect:
//!
//! - `*` matches one or more characters within a single path segment (never `/`)
//! - `**` matches zero or more characters, including `/` (any depth)
//! - every other character matches itself literally
//!
//! Patterns always match the *whole* relative path of a file. `*.txt` therefore
//! selects only top-level text files; crossing directory boundaries requires an
//! explicit `**`, as in `**/*.txt` or `docs/**`.
//!
//! An empty pattern list means `["**"]`: every file under the package root.
//!
//! # Relative Paths
//!
//! Candidate paths and patterns are normalized the same way before matching:
//! backslashes become forward slashes and a leading `./` is dropped. A file seen
//! as `a\b\c.txt` and one seen as `a/b/c.txt` are the same relative path.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sap_cli::pattern::select_files;
//! use std::path::Path;
//!
//! # fn example() -> sap_cli::core::Result<()> {
//! let files = select_files(Path::new("packages/demo"), &["sub/*", "**/*.md"])?;
//! for file in &files {
//!     println!("{file}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::constants::DEFAULT_PATTERN;
use crate::core::{Result, SapError};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Deduplicated, traversal-ordered list of relative paths selected for a package.
pub type FileSelection = Vec<String>;

/// Regex fragment substituted for `**`.
const ANY_DEPTH: &str = ".*";

/// Regex fragment substituted for `*`.
const SINGLE_SEGMENT: &str = "[^/]+";

/// Normalizes a path string to SAP's canonical relative form.
///
/// Backslash separators are replaced with forward slashes, then a single
/// leading `./` is removed.
///
/// # Examples
///
/// ```rust,no_run
/// use sap_cli::pattern::normalize_relative_path;
///
/// assert_eq!(normalize_relative_path(r"a\b\c.txt"), "a/b/c.txt");
/// assert_eq!(normalize_relative_path("./docs/readme.md"), "docs/readme.md");
/// assert_eq!(normalize_relative_path(r".\docs"), "docs");
/// ```
#[must_use]
pub fn normalize_relative_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    match forward.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => forward,
    }
}

/// A single compiled pattern.
///
/// The matcher is anchored at both ends: it matches a complete relative path
/// or nothing.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
    original_pattern: String,
}

impl PatternMatcher {
    /// Compiles a glob-like pattern.
    ///
    /// The pattern is normalized as a relative path, every regex metacharacter
    /// is escaped, and the escaped `**` and `*` tokens are replaced with their
    /// matching rules, `**` first so a double star is never consumed as two
    /// single stars.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::InvalidPattern`] if the translated expression cannot
    /// be compiled (for example when it exceeds the regex size limit).
    pub fn new(pattern: &str) -> Result<Self> {
        let escaped = regex::escape(&normalize_relative_path(pattern));
        let body = escaped.replace(r"\*\*", ANY_DEPTH).replace(r"\*", SINGLE_SEGMENT);
        let regex = Regex::new(&format!("^(?:{body})$")).map_err(|e| SapError::InvalidPattern {
            reason: format!("'{pattern}': {e}"),
        })?;

        trace!("Compiled pattern '{}' to {}", pattern, regex.as_str());

        Ok(Self {
            regex,
            original_pattern: pattern.to_string(),
        })
    }

    /// Checks a path against the pattern. The path is normalized first.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(&normalize_relative_path(path))
    }

    /// Returns the pattern string this matcher was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }
}

/// Compiles a list of patterns, defaulting to `**` when the list is empty.
///
/// # Errors
///
/// Returns [`SapError::InvalidPattern`] if any pattern fails to compile.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PatternMatcher>> {
    if patterns.is_empty() {
        return Ok(vec![PatternMatcher::new(DEFAULT_PATTERN)?]);
    }

    patterns.iter().map(|p| PatternMatcher::new(p.as_ref())).collect()
}

/// Extracts a pattern list from untyped JSON, as stored in package files.
///
/// `null` is treated as "no patterns" and yields an empty list.
///
/// # Errors
///
/// Returns [`SapError::InvalidPattern`] if the value is not an array of strings.
pub fn patterns_from_value(value: &serde_json::Value) -> Result<Vec<String>> {
    let items = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(items) => items,
        other => {
            return Err(SapError::InvalidPattern {
                reason: format!("patterns must be a list, found {other}"),
            });
        }
    };

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| SapError::InvalidPattern {
                reason: format!("patterns must be strings, found {item}"),
            })
        })
        .collect()
}

/// Walks `root` and returns every regular file matching at least one matcher.
///
/// Directories are traversed but never selected, and symlinks are not followed,
/// so the walk never leaves `root`. Entries are visited in file-name order at
/// every directory level, which makes the result stable across runs. A path is
/// added once even if several matchers accept it, or if two directory entries
/// normalize to the same relative path.
///
/// # Errors
///
/// - [`SapError::DirectoryNotFound`] if `root` is not a directory
/// - [`SapError::FileSystemError`] if part of the tree cannot be read
/// - [`SapError::EmptySelection`] if nothing matched
pub fn find_files(root: &Path, matchers: &[PatternMatcher]) -> Result<FileSelection> {
    if !root.is_dir() {
        return Err(SapError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }

    let mut selection = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| SapError::FileSystemError {
            operation: format!("walking package directory ({e})"),
            path: e
                .path()
                .map_or_else(|| root.display().to_string(), |p| p.display().to_string()),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = normalize_relative_path(&relative.to_string_lossy());

        trace!("Checking path: {}", relative);

        if seen.contains(&relative) {
            continue;
        }

        if let Some(matcher) = matchers.iter().find(|m| m.matches(&relative)) {
            debug!("Found match: {} (pattern '{}')", relative, matcher.pattern());
            seen.insert(relative.clone());
            selection.push(relative);
        }
    }

    if selection.is_empty() {
        return Err(SapError::EmptySelection {
            root: root.display().to_string(),
            patterns: matchers.iter().map(|m| m.pattern().to_string()).collect(),
        });
    }

    debug!("Selected {} files under {}", selection.len(), root.display());
    Ok(selection)
}

/// Compiles `patterns` and selects the matching files under `root`.
///
/// This is the entry point used when a source package is created or updated.
///
/// # Errors
///
/// Any error from [`compile_patterns`] or [`find_files`].
pub fn select_files<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<FileSelection> {
    debug!(
        "Finding files at {} with patterns {:?}",
        root.display(),
        patterns.iter().map(|p| p.as_ref()).collect::<Vec<&str>>()
    );
    let matchers = compile_patterns(patterns)?;
    find_files(root, &matchers)
}
