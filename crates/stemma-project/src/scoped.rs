//! Scoped process-state overrides
//!
//! RAII guards for environment variables and the working directory:
//! the previous state is captured on construction and restored on drop,
//! on every exit path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::project::ProjectError;

/// Temporarily set environment variables, restoring the previous values
/// (or absence) when the guard drops.
#[must_use = "dropping the guard restores the environment immediately"]
pub struct ScopedEnv {
    saved: Vec<(String, Option<OsString>)>,
}

impl ScopedEnv {
    pub fn set(vars: &[(&str, &str)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, _)| ((*key).to_owned(), std::env::var_os(key)))
            .collect();
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        Self { saved }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(previous) => std::env::set_var(key, previous),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// Temporarily change the working directory, restoring the previous one
/// when the guard drops.
#[must_use = "dropping the guard restores the working directory immediately"]
pub struct ScopedWorkingDir {
    previous: PathBuf,
}

impl ScopedWorkingDir {
    pub fn change(path: &Path) -> Result<Self, ProjectError> {
        let previous = std::env::current_dir()
            .map_err(|e| ProjectError::Io(".".to_owned(), e.to_string()))?;
        std::env::set_current_dir(path)
            .map_err(|e| ProjectError::Io(path.display().to_string(), e.to_string()))?;
        Ok(Self { previous })
    }
}

impl Drop for ScopedWorkingDir {
    fn drop(&mut self) {
        // Best effort: the previous directory may have been removed.
        let _ = std::env::set_current_dir(&self.previous);
    }
}
