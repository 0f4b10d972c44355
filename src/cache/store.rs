//! On-disk mirror cache for Git registries.

use crate::config::GlobalConfig;
use crate::error::{Result, StencilError};
use crate::registry::git::{self, GitTransport};
use crate::registry::location::{cache_key, clone_url, display_url, split_reference};
use crate::registry::{Registry, RegistryLocation};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolves registry locations, mirroring Git registries under a cache root.
///
/// Each Git location gets one bare clone, named by [`cache_key`]. The clone
/// is created on first use, fetched on every later use and only removed by
/// [`RegistryCache::clear`].
pub struct RegistryCache<'a> {
    root: PathBuf,
    global: &'a GlobalConfig,
    verbose: bool,
}

impl<'a> RegistryCache<'a> {
    /// Create a cache rooted at `root`, using credentials from `global`.
    pub fn new(root: impl Into<PathBuf>, global: &'a GlobalConfig) -> Self {
        Self {
            root: root.into(),
            global,
            verbose: false,
        }
    }

    /// Show clone and fetch progress.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the mirror of `location`.
    pub fn repo_path(&self, location: &str) -> PathBuf {
        self.root.join(cache_key(location))
    }

    /// Resolve a location that may carry an `@ref` suffix.
    pub fn open(&self, location: &str, base_dir: &Path) -> Result<Registry> {
        let (location, reference) = split_reference(location);
        self.get_registry(location, reference, base_dir)
    }

    /// Resolve `location` to a registry.
    ///
    /// Local paths are read in place, relative to `base_dir` unless absolute;
    /// `reference` does not apply to them. Git locations are cloned or
    /// fetched, then `reference` (or the default branch) is materialized in
    /// memory.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationRequired` if the remote wants credentials and
    /// none are configured, `AuthenticationFailed` if they were rejected and
    /// `Git` for any other transport or reference failure.
    pub fn get_registry(
        &self,
        location: &str,
        reference: Option<&str>,
        base_dir: &Path,
    ) -> Result<Registry> {
        match RegistryLocation::classify(location) {
            RegistryLocation::Local(path) => {
                if reference.is_some() {
                    debug!("Ignoring reference for local registry {}", location);
                }
                let root = absolute_dir(base_dir, &path).map_err(|source| {
                    StencilError::FileRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                if !root.is_dir() {
                    return Err(StencilError::FileRead {
                        path: root,
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "registry directory not found",
                        ),
                    });
                }
                debug!("Using local registry at {}", root.display());
                Ok(Registry::local(root))
            }
            RegistryLocation::Git(location) => self.get_git_registry(&location, reference),
        }
    }

    fn get_git_registry(&self, location: &str, reference: Option<&str>) -> Result<Registry> {
        let path = self.repo_path(location);
        let transport = GitTransport::new(location, clone_url(location))
            .with_credentials(self.global.credentials_for(location))
            .verbose(self.verbose);

        let repo = transport.sync(&path)?;
        let commit = git::resolve_commit(&repo, location, reference)?;
        let fs = git::snapshot(&repo, location, commit)?;

        Ok(Registry::snapshot(
            location,
            reference.map(str::to_string),
            commit.to_string(),
            fs,
        ))
    }

    /// Remote URLs of all cached mirrors, without scheme, sorted.
    ///
    /// Entries that are not bare repositories with an `origin` are skipped.
    pub fn list_registries(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StencilError::FileRead {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut urls = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            match git::origin_url(&path) {
                Some(url) => urls.push(display_url(&url).to_string()),
                None => debug!("Skipping {}: not a registry mirror", path.display()),
            }
        }
        urls.sort();
        Ok(urls)
    }

    /// Delete every cached mirror.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StencilError::FileWrite {
                path: self.root.clone(),
                source,
            }),
        }
    }
}

/// `path` made absolute against `base_dir`, with `.` and `..` folded lexically.
fn absolute_dir(base_dir: &Path, path: &Path) -> std::io::Result<PathBuf> {
    let joined = std::path::absolute(base_dir.join(path))?;
    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    clean.push(component);
                }
            }
            other => clean.push(other),
        }
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn repo_path_uses_cache_key() {
        let global = GlobalConfig::default();
        let cache = RegistryCache::new("/cache", &global);
        assert_eq!(
            cache.repo_path("github.com/org/repo"),
            PathBuf::from("/cache/github.com_org_repo")
        );
    }

    #[test]
    fn local_registry_resolves_relative_to_base() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("components")).unwrap();
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(temp.path().join("cache"), &global);

        let registry = cache
            .get_registry("./components", None, temp.path())
            .unwrap();
        assert_eq!(
            registry.name(),
            temp.path().join("components").display().to_string()
        );
        assert!(!cache.root().exists());
    }

    #[test]
    fn local_registry_path_is_cleaned() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("registry")).unwrap();
        fs::create_dir_all(temp.path().join("app")).unwrap();
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(temp.path().join("cache"), &global);

        let registry = cache
            .get_registry("../registry/./", None, &temp.path().join("app"))
            .unwrap();
        assert_eq!(
            registry.name(),
            temp.path().join("registry").display().to_string()
        );
    }

    #[test]
    #[cfg(unix)]
    fn absolute_dir_folds_dots() {
        let base = Path::new("/work/app");
        assert_eq!(
            absolute_dir(base, Path::new("./a/../b")).unwrap(),
            PathBuf::from("/work/app/b")
        );
        assert_eq!(
            absolute_dir(base, Path::new("/srv/reg")).unwrap(),
            PathBuf::from("/srv/reg")
        );
    }

    #[test]
    fn missing_local_registry_fails() {
        let temp = TempDir::new().unwrap();
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(temp.path().join("cache"), &global);
        let err = cache
            .get_registry("./missing", None, temp.path())
            .unwrap_err();
        assert!(matches!(err, StencilError::FileRead { .. }));
    }

    #[test]
    fn list_of_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(temp.path().join("none"), &global);
        assert!(cache.list_registries().unwrap().is_empty());
    }

    #[test]
    fn list_skips_non_repositories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("junk")).unwrap();
        fs::write(temp.path().join("file.txt"), "x").unwrap();
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(temp.path(), &global);
        assert!(cache.list_registries().unwrap().is_empty());
    }

    #[test]
    fn clear_removes_root_and_tolerates_absence() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("cache");
        fs::create_dir_all(root.join("a_b_c")).unwrap();
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(&root, &global);

        cache.clear().unwrap();
        assert!(!root.exists());
        cache.clear().unwrap();
    }
}
