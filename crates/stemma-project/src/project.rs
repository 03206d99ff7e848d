//! Project directory introspection and scratch-folder plumbing

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use stemma_core::constants::{
    DEFAULT_PACKAGES_FOLDER, DEPENDENCIES_FILE_NAMES, LOG_DIR_NAME, MANIFEST_FILE_NAME,
    PACKAGES_INSTALL_PATH_KEY, PACKAGE_LOCKFILE, PARTIAL_PARSE_FILE_NAME, PROJECT_FILE_NAME,
    TARGET_DIR_NAME,
};

/// Project utility errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("dbt_project.yml not found at {0}")]
    ProjectFileNotFound(String),

    #[error("IO error on {0}: {1}")]
    Io(String, String),

    #[error("YAML error: {0}")]
    Yaml(String),
}

fn io_err(path: &Path, err: std::io::Error) -> ProjectError {
    ProjectError::Io(path.display().to_string(), err.to_string())
}

/// Check whether the project declares package dependencies
/// (a non-empty `packages.yml` or `dependencies.yml`).
pub fn has_non_empty_dependencies_file(project_dir: &Path) -> bool {
    for filename in DEPENDENCIES_FILE_NAMES {
        let filepath = project_dir.join(filename);
        if let Ok(metadata) = fs::metadata(&filepath) {
            if metadata.len() > 0 {
                return true;
            }
        }
    }

    info!(
        project = %project_dir.display(),
        "project has no packages.yml or dependencies.yml"
    );
    false
}

/// Return the project's package installation subpath.
///
/// `dbt deps` installs into `dbt_packages` unless the project overrides it
/// via `packages-install-path` in `dbt_project.yml`. An unreadable or
/// unparseable descriptor falls back to the default.
pub fn packages_install_subpath(project_dir: &Path) -> String {
    let descriptor = project_dir.join(PROJECT_FILE_NAME);
    if let Ok(contents) = fs::read_to_string(&descriptor) {
        match serde_yaml::from_str::<serde_yaml::Value>(&contents) {
            Ok(config) => {
                if let Some(subpath) = config
                    .get(PACKAGES_INSTALL_PATH_KEY)
                    .and_then(serde_yaml::Value::as_str)
                {
                    return subpath.to_owned();
                }
            }
            Err(_) => info!("unable to read the {PROJECT_FILE_NAME} file"),
        }
    }
    DEFAULT_PACKAGES_FOLDER.to_owned()
}

/// Copy the project's installed packages (the packages folder plus the
/// package lockfile) from `source_dir` into `target_dir`.
pub fn copy_packages(source_dir: &Path, target_dir: &Path) -> Result<(), ProjectError> {
    info!("copying dbt packages to temporary folder");

    let packages_folder = packages_install_subpath(source_dir);
    for relative_path in [packages_folder.as_str(), PACKAGE_LOCKFILE] {
        let src_path = source_dir.join(relative_path);
        let dst_path = target_dir.join(relative_path);

        if !src_path.exists() {
            continue;
        }
        if let Some(parent) = dst_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        if src_path.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(|e| io_err(&src_path, e))?;
        }
    }

    info!("completed copying dbt packages to temporary folder");
    Ok(())
}

fn copy_tree(src_root: &Path, dst_root: &Path) -> Result<(), ProjectError> {
    for entry in WalkDir::new(src_root) {
        let entry = entry.map_err(|e| {
            ProjectError::Io(src_root.display().to_string(), e.to_string())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src_root)
            .unwrap_or_else(|_| Path::new(""));
        let destination = dst_root.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|e| io_err(&destination, e))?;
        } else {
            fs::copy(entry.path(), &destination).map_err(|e| io_err(entry.path(), e))?;
        }
    }
    Ok(())
}

/// Copy a compiled manifest, if it exists, into the project's target
/// folder as `target/manifest.json`.
pub fn copy_manifest_if_exists(
    source_manifest: &Path,
    project_dir: &Path,
) -> Result<(), ProjectError> {
    if !source_manifest.exists() {
        return Ok(());
    }

    info!(manifest = %source_manifest.display(), "copying the manifest");
    let target_dir = project_dir.join(TARGET_DIR_NAME);
    fs::create_dir_all(&target_dir).map_err(|e| io_err(&target_dir, e))?;
    fs::copy(source_manifest, target_dir.join(MANIFEST_FILE_NAME))
        .map_err(|e| io_err(source_manifest, e))?;

    Ok(())
}

/// Symlink every project file into `tmp_dir`, skipping logs, compiled
/// artifacts, the lockfile, and profiles. With `ignore_packages` the
/// installed packages folder is skipped too (it gets reinstalled by
/// `dbt deps` in the scratch dir).
pub fn create_symlinks(
    project_dir: &Path,
    tmp_dir: &Path,
    ignore_packages: bool,
) -> Result<(), ProjectError> {
    let mut ignore_paths = vec![
        LOG_DIR_NAME.to_owned(),
        TARGET_DIR_NAME.to_owned(),
        PACKAGE_LOCKFILE.to_owned(),
        "profiles.yml".to_owned(),
    ];
    if ignore_packages {
        ignore_paths.push(packages_install_subpath(project_dir));
    }

    for entry in fs::read_dir(project_dir).map_err(|e| io_err(project_dir, e))? {
        let entry = entry.map_err(|e| io_err(project_dir, e))?;
        let child_name = entry.file_name();
        if ignore_paths
            .iter()
            .any(|ignored| child_name == ignored.as_str())
        {
            continue;
        }

        let link = tmp_dir.join(&child_name);
        std::os::unix::fs::symlink(entry.path(), &link).map_err(|e| io_err(&link, e))?;
    }

    Ok(())
}

/// Path of the partial parse artifact for a project directory.
pub fn partial_parse_path(project_dir: &Path) -> PathBuf {
    project_dir.join(TARGET_DIR_NAME).join(PARTIAL_PARSE_FILE_NAME)
}
