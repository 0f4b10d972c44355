//! User-wide configuration: known registries and their credentials.
//!
//! Stored as YAML at `<config dir>/stencil/config.yaml`:
//!
//! ```yaml
//! registries:
//!   github.com/acme/components:
//!     http:
//!       username: me
//!       password: token
//!   gitlab.com/acme/internal:
//!     ssh:
//!       privateKeyPath: ~/.ssh/id_ed25519
//!       password: passphrase
//! ```

use crate::error::{Result, StencilError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the global config file.
pub fn default_global_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stencil")
        .join("config.yaml")
}

/// User-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Where this config is loaded from and saved to
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Registries by location
    #[serde(default)]
    pub registries: BTreeMap<String, RegistryAuth>,
}

/// Credentials recorded for one registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpAuth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshAuth>,
}

/// HTTP basic credentials (password is usually an access token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpAuth {
    pub username: String,
    pub password: String,
}

/// SSH private key credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshAuth {
    #[serde(rename = "privateKeyPath")]
    pub private_key_path: PathBuf,

    /// Key passphrase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// The credential a transport should use for a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Http(HttpAuth),
    Ssh(SshAuth),
}

impl GlobalConfig {
    /// Load the config at `path`; a missing file yields an empty config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` if the file exists but is not valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => GlobalConfig::default(),
            Ok(content) => {
                serde_yaml::from_str(&content).map_err(|e| StencilError::ConfigParseError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No global config at {}", path.display());
                GlobalConfig::default()
            }
            Err(source) => {
                return Err(StencilError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Write the config back to its path, creating parent directories.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StencilError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_yaml::to_string(self).map_err(|e| anyhow::anyhow!(e))?;
        fs::write(&self.config_path, content).map_err(|source| StencilError::FileWrite {
            path: self.config_path.clone(),
            source,
        })
    }

    /// Credentials for `location`, preferring HTTP over SSH.
    pub fn credentials_for(&self, location: &str) -> Option<Credentials> {
        let auth = self.registries.get(location)?;
        if let Some(http) = &auth.http {
            return Some(Credentials::Http(http.clone()));
        }
        auth.ssh.clone().map(Credentials::Ssh)
    }

    /// All recorded registry locations, sorted.
    pub fn registry_locations(&self) -> Vec<&str> {
        self.registries.keys().map(String::as_str).collect()
    }

    /// Record a registry without changing existing credentials.
    pub fn add_registry(&mut self, location: &str) {
        self.registries.entry(location.to_string()).or_default();
    }

    /// Replace the credentials for `location`.
    pub fn set_auth(&mut self, location: &str, auth: RegistryAuth) {
        self.registries.insert(location.to_string(), auth);
    }

    /// Forget the credentials for `location` but keep the registry.
    ///
    /// Returns `false` if the registry is unknown.
    pub fn clear_auth(&mut self, location: &str) -> bool {
        match self.registries.get_mut(location) {
            Some(auth) => {
                *auth = RegistryAuth::default();
                true
            }
            None => false,
        }
    }

    /// Forget a registry entirely.
    ///
    /// Returns `false` if the registry is unknown.
    pub fn remove(&mut self, location: &str) -> bool {
        self.registries.remove(location).is_some()
    }
}
