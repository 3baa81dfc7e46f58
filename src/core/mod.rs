//! Core types for SAP
//!
//! This module holds the error system shared by every other module:
//! - [`SapError`] - Enumerated error types covering all SAP failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Error First Design
//!
//! Every operation that can fail returns a [`Result`] with meaningful error
//! information. The engine modules (`pattern`, `archive`, `version`) return
//! [`SapError`] directly; glue code wraps them in `anyhow` with context.

pub mod error;

pub use error::{ErrorContext, Result, SapError, user_friendly_error};
