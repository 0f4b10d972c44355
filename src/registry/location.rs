//! Registry location parsing.
//!
//! A location is either a filesystem path or a Git remote, optionally pinned
//! to a reference with an `@ref` suffix:
//!
//! - `./components`, `/srv/components`, `C:\components` - local directories
//! - `github.com/acme/components` - cloned over HTTPS
//! - `github.com/acme/components@v2` - pinned to branch, tag or commit `v2`
//! - `ssh://git@host/acme/components`, `git@host:acme/components` - used as given

use std::path::{Path, PathBuf};

/// Where a registry lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLocation {
    /// A directory read in place.
    Local(PathBuf),
    /// A Git remote mirrored into the cache.
    Git(String),
}

impl RegistryLocation {
    /// Classify a location string (without `@ref` suffix).
    ///
    /// Anything that is not absolute, has no volume prefix and does not start
    /// with `.` or `/` is a Git location.
    pub fn classify(location: &str) -> Self {
        if is_local_path(location) {
            Self::Local(PathBuf::from(location))
        } else {
            Self::Git(location.to_string())
        }
    }

    /// Whether this location is a Git remote.
    pub fn is_git(&self) -> bool {
        matches!(self, Self::Git(_))
    }
}

fn is_local_path(location: &str) -> bool {
    location.starts_with('.')
        || location.starts_with('/')
        || location.starts_with('\\')
        || Path::new(location).is_absolute()
        || has_volume_prefix(location)
}

fn has_volume_prefix(location: &str) -> bool {
    let bytes = location.as_bytes();
    bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'\\' || bytes[2] == b'/')
}

fn strip_scheme(location: &str) -> &str {
    location
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(location)
}

/// Split a trailing `@ref` off a Git location.
///
/// The `@` of URL user info (`git@host:org/repo`, `ssh://git@host/org/repo`)
/// is not a separator: a reference is only recognised after a `/`. Local
/// paths are never split.
pub fn split_reference(location: &str) -> (&str, Option<&str>) {
    if is_local_path(location) {
        return (location, None);
    }

    let offset = location.len() - strip_scheme(location).len();
    let Some(at) = location.rfind('@') else {
        return (location, None);
    };
    if at < offset || !location[offset..at].contains('/') {
        return (location, None);
    }

    let reference = &location[at + 1..];
    if reference.is_empty() {
        (&location[..at], None)
    } else {
        (&location[..at], Some(reference))
    }
}

/// URL to clone a Git location from.
///
/// Locations with a scheme or in scp form (`user@host:path`) are used as
/// given; anything else is fetched over HTTPS.
pub fn clone_url(location: &str) -> String {
    if location.contains("://") || is_scp_like(location) {
        location.to_string()
    } else {
        format!("https://{location}")
    }
}

fn is_scp_like(location: &str) -> bool {
    let Some((user_host, _path)) = location.split_once(':') else {
        return false;
    };
    match user_host.split_once('@') {
        Some((user, host)) => !user.is_empty() && !host.is_empty() && !user_host.contains('/'),
        None => false,
    }
}

/// Directory name for a location inside the cache root.
///
/// `/` becomes `_`; `_`, `%`, `\`, `:` and `@` are percent-escaped, so
/// distinct locations never share a directory.
pub fn cache_key(location: &str) -> String {
    let mut key = String::with_capacity(location.len());
    for c in location.chars() {
        match c {
            '/' => key.push('_'),
            '_' | '%' | '\\' | ':' | '@' => key.push_str(&format!("%{:02X}", c as u32)),
            c => key.push(c),
        }
    }
    key
}

/// A remote URL without its scheme, for display.
pub fn display_url(url: &str) -> &str {
    strip_scheme(url)
}
