//! dbt project file utilities
//!
//! Filesystem-level helpers around a dbt project directory:
//! - dependency-file and packages-directory introspection
//! - copying packages and compiled manifests into scratch project folders
//! - symlink farms for temporary project dirs
//! - runtime mutation of `dbt_project.yml` via dot-notated keys
//! - scoped environment and working-directory overrides

pub mod project;
pub mod project_keys;
pub mod scoped;

pub use project::{
    copy_manifest_if_exists, copy_packages, create_symlinks, has_non_empty_dependencies_file,
    packages_install_subpath, partial_parse_path, ProjectError,
};
pub use project_keys::apply_project_keys;
pub use scoped::{ScopedEnv, ScopedWorkingDir};
