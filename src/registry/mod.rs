//! Component registries.
//!
//! A registry is a directory tree of component manifests and templates. It
//! lives either in a local directory or in a Git repository:
//!
//! - [`location`] classifies location strings and derives clone URLs
//! - [`fs`] is the read-only filesystem view a registry is built on
//! - [`git`] mirrors remotes and materializes commits in memory
//! - [`resolver`] looks components up in a resolved registry
//!
//! Resolving a location to a [`Registry`] is the job of
//! [`crate::cache::RegistryCache`].
//!
//! # Example
//!
//! ```
//! use stencil::registry::{MemoryFs, Registry};
//!
//! let mut fs = MemoryFs::new();
//! fs.insert(
//!     "web/button/stencil.yaml",
//!     "name: button\nplatform: web\nfiles:\n  - src: button.tsx\n    dst: button.tsx\n",
//! );
//! let registry = Registry::snapshot("example.com/ui", None, "0000000", fs);
//! let button = registry.resolve_component("web", "button").unwrap();
//! assert_eq!(button.files.len(), 1);
//! ```

pub mod fs;
pub mod git;
pub mod location;
pub mod resolver;

pub use fs::{FsEntry, LocalFs, MemoryFs, RegistryFs};
pub use git::GitTransport;
pub use location::{cache_key, clone_url, display_url, split_reference, RegistryLocation};
pub use resolver::Registry;
