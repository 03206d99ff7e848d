//! Well-known dbt project file names and defaults.

/// Compiled manifest artifact produced by `dbt compile` / `dbt build`.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Project descriptor at the root of every dbt project.
pub const PROJECT_FILE_NAME: &str = "dbt_project.yml";

/// Directory dbt writes compiled artifacts into.
pub const TARGET_DIR_NAME: &str = "target";

/// Directory dbt writes logs into.
pub const LOG_DIR_NAME: &str = "logs";

/// Partial parse artifact inside the target directory.
pub const PARTIAL_PARSE_FILE_NAME: &str = "partial_parse.msgpack";

/// Default directory `dbt deps` installs packages into.
pub const DEFAULT_PACKAGES_FOLDER: &str = "dbt_packages";

/// `dbt_project.yml` key overriding the packages install directory.
pub const PACKAGES_INSTALL_PATH_KEY: &str = "packages-install-path";

/// Lockfile written by `dbt deps`.
pub const PACKAGE_LOCKFILE: &str = "package-lock.yml";

/// Files that declare package dependencies for a project.
pub const DEPENDENCIES_FILE_NAMES: [&str; 2] = ["packages.yml", "dependencies.yml"];

/// Manifest size (in megabytes) at which streaming decode kicks in
/// when enabled.
pub const DEFAULT_STREAMING_THRESHOLD_MB: u64 = 25;
