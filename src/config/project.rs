//! Per-project configuration (`.stencil.yaml`).
//!
//! The project config pins the registry and platform a project draws its
//! components from, and holds the variable bindings used when adding them.
//! It is discovered by walking up from the working directory.

use crate::config::interpolation::Variables;
use crate::error::{Result, StencilError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the project config.
pub const PROJECT_FILE: &str = ".stencil.yaml";

/// Configuration of a single project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory containing the config file; destinations are relative to it
    #[serde(skip)]
    pub project_dir: PathBuf,

    /// Registry location, optionally suffixed with `@ref`
    #[serde(default)]
    pub registry: String,

    /// Platform components are drawn from
    #[serde(default)]
    pub platform: String,

    /// Variable bindings for paths and file contents
    #[serde(default)]
    pub variables: Variables,
}

impl ProjectConfig {
    /// Create a config for `project_dir`.
    pub fn new(
        project_dir: impl Into<PathBuf>,
        registry: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            registry: registry.into(),
            platform: platform.into(),
            variables: Variables::new(),
        }
    }

    /// Path of the config file.
    pub fn path(&self) -> PathBuf {
        self.project_dir.join(PROJECT_FILE)
    }

    /// Load the config stored directly in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if `dir` has no config file,
    /// `ConfigParseError` for invalid YAML and `ConfigValidationError` if
    /// the registry or platform is missing.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(PROJECT_FILE);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StencilError::ConfigNotFound { path: path.clone() }
            } else {
                StencilError::FileRead {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        let mut config: ProjectConfig =
            serde_yaml::from_str(&content).map_err(|e| StencilError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        config.project_dir = dir.to_path_buf();
        config.validate()?;

        debug!("Loaded project config from {}", path.display());
        Ok(config)
    }

    /// Load the nearest config at or above `start`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` (naming `start`) if no ancestor has one.
    pub fn find_nearest(start: &Path) -> Result<Self> {
        match find_project_dir(start) {
            Some(dir) => Self::load(&dir),
            None => Err(StencilError::ConfigNotFound {
                path: start.join(PROJECT_FILE),
            }),
        }
    }

    /// Check that the required fields are present.
    pub fn validate(&self) -> Result<()> {
        if self.registry.trim().is_empty() {
            return Err(StencilError::ConfigValidationError {
                message: format!("registry is required in {}", self.path().display()),
            });
        }
        if self.platform.trim().is_empty() {
            return Err(StencilError::ConfigValidationError {
                message: format!("platform is required in {}", self.path().display()),
            });
        }
        Ok(())
    }

    /// Write the config to [`ProjectConfig::path`].
    pub fn save(&self) -> Result<()> {
        let path = self.path();
        let content = serde_yaml::to_string(self).map_err(|e| anyhow::anyhow!(e))?;
        fs::write(&path, content).map_err(|source| StencilError::FileWrite { path, source })
    }
}

/// Find the closest directory at or above `start` holding a project config.
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_FILE).is_file())
        .map(Path::to_path_buf)
}
