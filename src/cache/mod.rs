//! Registry resolution and the Git mirror cache.
//!
//! Git registries are mirrored as bare clones under the cache root and
//! refreshed on every access; local registries bypass the cache.

pub mod store;

pub use store::RegistryCache;

/// Get the default cache directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("stencil")
        .join("registries")
}
