//! Component manifests and registry scanning.
//!
//! A component is a directory containing a `stencil.yaml` manifest next to
//! the template files it declares. Components are keyed by platform and name,
//! and that pair must be unique across a registry.

use crate::config::interpolation::{find_variables, resolve_string, Variables};
use crate::error::{Result, StencilError};
use crate::registry::fs::RegistryFs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the manifest file inside a component directory.
pub const MANIFEST_FILE: &str = "stencil.yaml";

/// Components of a registry, indexed by platform and then by name.
pub type ComponentIndex = BTreeMap<String, BTreeMap<String, Component>>;

/// A reusable component definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Directory of the component, relative to the registry root
    #[serde(skip)]
    pub path: PathBuf,

    /// Component name (unique per platform within a registry)
    #[serde(default)]
    pub name: String,

    /// Human-readable title (e.g. "Image Card" for `image-card`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category used to group listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Platform this component targets
    #[serde(default)]
    pub platform: String,

    /// Preview assets
    #[serde(default, skip_serializing_if = "Preview::is_empty")]
    pub preview: Preview,

    /// Default values for the variables the component uses
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: Variables,

    /// Files copied into the project
    pub files: Vec<ComponentFile>,

    /// Other components (same platform) added along with this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// Preview metadata for a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// Screenshot or illustration URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Live demo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
}

impl Preview {
    fn is_empty(&self) -> bool {
        self.image.is_none() && self.demo.is_none()
    }
}

/// A file declared by a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFile {
    /// Source path relative to the component directory
    pub src: String,

    /// Destination path relative to the project, may contain placeholders
    pub dst: String,
}

/// A declared file whose destination has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Source path relative to the component directory (unchanged)
    pub src: String,

    /// Destination path relative to the project, placeholders substituted
    pub dst: String,
}

impl Component {
    /// Title for display, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Registry path of one of this component's source files.
    pub fn source_path(&self, src: &str) -> PathBuf {
        self.path.join(src)
    }

    /// Variables referenced by destination paths, in first-occurrence order.
    pub fn path_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for file in &self.files {
            for name in find_variables(&file.dst) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Resolve destination paths of all declared files.
    ///
    /// All variables used in destination paths are checked up front so that
    /// nothing is resolved while a binding is missing. File contents are not
    /// inspected here.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` naming the first missing variable.
    pub fn resolve_files(&self, variables: &Variables) -> Result<Vec<ResolvedFile>> {
        if let Some(missing) = self
            .path_variables()
            .into_iter()
            .find(|name| !variables.contains_key(name))
        {
            return Err(StencilError::UndefinedVariable { name: missing });
        }

        self.files
            .iter()
            .map(|file| {
                Ok(ResolvedFile {
                    src: file.src.clone(),
                    dst: resolve_string(&file.dst, variables)?,
                })
            })
            .collect()
    }
}

/// Load the component whose manifest lives in `dir`.
///
/// # Errors
///
/// Returns `FileRead` if the manifest cannot be read and `InvalidComponent`
/// if it cannot be parsed or lacks a name or platform.
pub fn load_component(fs: &dyn RegistryFs, dir: &Path) -> Result<Component> {
    let manifest = dir.join(MANIFEST_FILE);
    let bytes = fs.read(&manifest).map_err(|source| StencilError::FileRead {
        path: manifest.clone(),
        source,
    })?;

    let mut component: Component =
        serde_yaml::from_slice(&bytes).map_err(|e| StencilError::InvalidComponent {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

    if component.name.trim().is_empty() {
        return Err(StencilError::InvalidComponent {
            path: dir.to_path_buf(),
            message: "component name is required".to_string(),
        });
    }
    if component.platform.trim().is_empty() {
        return Err(StencilError::InvalidComponent {
            path: dir.to_path_buf(),
            message: "component platform is required".to_string(),
        });
    }

    component.path = dir.to_path_buf();
    Ok(component)
}

/// Scan a registry tree for components.
///
/// Every directory below `root` that directly contains a manifest is a
/// component; its subdirectories are not scanned. Directories are visited in
/// name order, so a duplicate is always reported at the same location.
///
/// # Errors
///
/// Returns `DuplicateComponent` if two manifests share platform and name, and
/// propagates manifest and directory read errors.
pub fn scan_components(fs: &dyn RegistryFs, root: &Path) -> Result<ComponentIndex> {
    let mut index = ComponentIndex::new();
    scan_dir(fs, root, &mut index)?;
    debug!(
        "Scanned {} components across {} platforms",
        index.values().map(BTreeMap::len).sum::<usize>(),
        index.len()
    );
    Ok(index)
}

fn scan_dir(fs: &dyn RegistryFs, dir: &Path, index: &mut ComponentIndex) -> Result<()> {
    let entries = fs.read_dir(dir).map_err(|source| StencilError::FileRead {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.into_iter().filter(|e| e.is_dir) {
        let entry_path = dir.join(&entry.name);

        if !fs.is_file(&entry_path.join(MANIFEST_FILE)) {
            scan_dir(fs, &entry_path, index)?;
            continue;
        }

        let component = load_component(fs, &entry_path)?;
        let platform = index.entry(component.platform.clone()).or_default();
        if platform.contains_key(&component.name) {
            return Err(StencilError::DuplicateComponent {
                platform: component.platform,
                name: component.name,
                path: entry_path,
            });
        }
        platform.insert(component.name.clone(), component);
    }

    Ok(())
}
