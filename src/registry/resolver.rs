//! Component lookup over a resolved registry.

use crate::config::component::{scan_components, Component, ComponentIndex};
use crate::error::{Result, StencilError};
use crate::registry::fs::{LocalFs, MemoryFs, RegistryFs};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A read-only handle on a registry's files.
///
/// The backing storage is chosen when the handle is built and never changes:
/// a live directory for local registries, a commit snapshot for Git ones.
pub struct Registry {
    name: String,
    reference: Option<String>,
    commit: Option<String>,
    fs: Box<dyn RegistryFs>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("reference", &self.reference)
            .field("commit", &self.commit)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// A registry read in place from `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: root.display().to_string(),
            reference: None,
            commit: None,
            fs: Box::new(LocalFs::new(root)),
        }
    }

    /// A registry backed by a commit snapshot.
    pub fn snapshot(
        name: impl Into<String>,
        reference: Option<String>,
        commit: impl Into<String>,
        fs: MemoryFs,
    ) -> Self {
        Self {
            name: name.into(),
            reference,
            commit: Some(commit.into()),
            fs: Box::new(fs),
        }
    }

    /// Identifying name: the remote location or the local path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requested reference, if one was pinned.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// The resolved commit id for Git registries.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    /// Read a file relative to the registry root.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.fs.read(path).map_err(|source| StencilError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Scan the whole registry for components.
    pub fn scan_components(&self) -> Result<ComponentIndex> {
        scan_components(self.fs.as_ref(), Path::new(""))
    }

    /// Components of one platform, by name.
    ///
    /// # Errors
    ///
    /// Returns `PlatformNotFound` if the registry has none for `platform`.
    pub fn platform_components(&self, platform: &str) -> Result<BTreeMap<String, Component>> {
        self.scan_components()?
            .remove(platform)
            .ok_or_else(|| StencilError::PlatformNotFound {
                platform: platform.to_string(),
            })
    }

    /// Find a component by platform and name.
    ///
    /// # Errors
    ///
    /// Returns `PlatformNotFound` or `ComponentNotFound` depending on which
    /// level of the lookup failed.
    pub fn resolve_component(&self, platform: &str, name: &str) -> Result<Component> {
        self.platform_components(platform)?
            .remove(name)
            .ok_or_else(|| StencilError::ComponentNotFound {
                platform: platform.to_string(),
                name: name.to_string(),
            })
    }
}
