//! Integration test suite for SAP
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **selection**: pattern compilation and file walking on real trees
//! - **archive**: building and extracting package archives
//! - **source_workflow**: `sap source` commands
//! - **install_workflow**: `sap save`, `sap remove` and `sap list`

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod archive;
mod install_workflow;
mod selection;
mod source_workflow;
