//! Global constants used throughout the SAP codebase.
//!
//! File names, default values, and environment variable names live here so the
//! CLI, the configuration layer and the package collections agree on them.

/// Version assigned to a newly added package when none is given.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// Pattern used when a package lists no patterns: every file, any depth.
pub const DEFAULT_PATTERN: &str = "**";

/// Default name of the source collection file.
pub const SOURCE_FILE_NAME: &str = "sap-source.json";

/// Default name of the install target file.
pub const TARGET_FILE_NAME: &str = "sap.json";

/// Name of the installed-package manifest inside the sap directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Name of the global configuration file inside the sap directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the download cache directory inside the sap directory.
pub const CACHE_DIR_NAME: &str = "cache";

/// Name of the registry directory backing the server stub.
pub const REGISTRY_DIR_NAME: &str = "registry";

/// Default server host.
pub const DEFAULT_SERVER_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Environment variable overriding the sap directory (`~/.sap`).
pub const SAP_HOME_ENV: &str = "SAP_HOME";

/// Environment variable overriding the server host.
pub const SAP_SERVER_ENV: &str = "SAP_SERVER";

/// Timestamp format stored in `modified` and `created` fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
