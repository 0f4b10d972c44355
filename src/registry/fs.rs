//! Read-only filesystem views over a registry.
//!
//! A registry is either a live local directory ([`LocalFs`]) or a snapshot of
//! a Git commit held in memory ([`MemoryFs`]). Both are addressed with
//! relative paths; the empty path is the registry root.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// An entry returned by [`RegistryFs::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FsEntry {
    /// File or directory name (a single path segment).
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Capability interface the registry needs from its storage.
pub trait RegistryFs {
    /// Read the full contents of a file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// List the entries of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>>;

    /// Check whether a regular file exists at `path`.
    fn is_file(&self, path: &Path) -> bool;
}

/// Normalize a registry-relative path.
///
/// Drops `.` segments and rejects anything that could leave the root.
fn normalize(path: &Path) -> io::Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path escapes registry root: {}", path.display()),
                ))
            }
        }
    }
    Ok(normalized)
}

/// A registry backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a view rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.root.join(normalize(path)?))
    }
}

impl RegistryFs for LocalFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.full_path(path)?)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.full_path(path)?)? {
            let entry = entry?;
            // Follows symlinks so linked component directories are scanned.
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            entries.push(FsEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.full_path(path).is_ok_and(|p| p.is_file())
    }
}

/// A registry snapshot held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryFs {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Parent directories exist implicitly.
    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        if let Ok(path) = normalize(path.as_ref()) {
            self.files.insert(path, contents.into());
        }
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn is_dir(&self, dir: &Path) -> bool {
        dir.as_os_str().is_empty() || self.files.keys().any(|p| p.starts_with(dir) && p != dir)
    }
}

impl RegistryFs for MemoryFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = normalize(path)?;
        self.files.get(&path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let dir = normalize(path)?;
        if !self.is_dir(&dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {}", dir.display()),
            ));
        }

        let mut entries = BTreeSet::new();
        for file in self.files.keys() {
            let Ok(rest) = file.strip_prefix(&dir) else {
                continue;
            };
            let mut parts = rest.components();
            let Some(first) = parts.next() else {
                continue;
            };
            entries.insert(FsEntry {
                name: first.as_os_str().to_string_lossy().into_owned(),
                is_dir: parts.next().is_some(),
            });
        }
        Ok(entries.into_iter().collect())
    }

    fn is_file(&self, path: &Path) -> bool {
        normalize(path).is_ok_and(|p| self.files.contains_key(&p))
    }
}
