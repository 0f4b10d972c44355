//! Git transport for registries, built on libgit2.
//!
//! Remote registries are mirrored as bare repositories in the cache. Every
//! access fetches all branches into the mirror, resolves the requested
//! reference and reads the commit's tree into a [`MemoryFs`]. No working
//! tree is ever written to disk.

use crate::config::Credentials;
use crate::error::{Result, StencilError};
use crate::registry::fs::MemoryFs;
use git2::build::RepoBuilder;
use git2::{
    AutotagOption, Cred, CredentialType, ErrorCode, FetchOptions, FetchPrune, ObjectType,
    RemoteCallbacks, Repository,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Refspec mirroring every remote branch onto the local branch of the same name.
const FETCH_REFSPEC: &str = "+refs/heads/*:refs/heads/*";

/// Tracks what the remote asked for while a transfer runs.
#[derive(Debug, Default)]
struct AuthState {
    /// The remote asked for credentials and none were configured.
    missing: Cell<bool>,
    /// Configured credentials were handed out at least once.
    supplied: Cell<bool>,
    /// The remote asked again after credentials were supplied.
    rejected: Cell<bool>,
}

impl AuthState {
    fn into_error(self, location: &str, err: git2::Error) -> StencilError {
        let auth_code = err.code() == ErrorCode::Auth;
        if self.rejected.get() || (auth_code && self.supplied.get()) {
            StencilError::AuthenticationFailed {
                location: location.to_string(),
            }
        } else if self.missing.get() || auth_code {
            StencilError::AuthenticationRequired {
                location: location.to_string(),
            }
        } else {
            StencilError::Git {
                location: location.to_string(),
                source: err,
            }
        }
    }
}

/// Clone and fetch operations for one registry location.
pub struct GitTransport<'a> {
    location: &'a str,
    url: String,
    credentials: Option<Credentials>,
    verbose: bool,
}

impl<'a> GitTransport<'a> {
    /// Create a transport for `location`, reachable at `url`.
    pub fn new(location: &'a str, url: impl Into<String>) -> Self {
        Self {
            location,
            url: url.into(),
            credentials: None,
            verbose: false,
        }
    }

    /// Use `credentials` when the remote asks for them.
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Show transfer progress on stderr.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Open the bare mirror at `path`, fetching updates, or clone it.
    ///
    /// A mirror whose `origin` is not this transport's URL is replaced by a
    /// fresh clone. A failed clone leaves nothing behind at `path`.
    pub fn sync(&self, path: &Path) -> Result<Repository> {
        if path.exists() {
            match Repository::open_bare(path) {
                Ok(repo) if remote_url(&repo).as_deref() == Some(self.url.as_str()) => {
                    self.fetch(&repo)?;
                    return Ok(repo);
                }
                Ok(repo) => {
                    debug!(
                        "Discarding mirror at {}: origin {:?} is not {}",
                        path.display(),
                        remote_url(&repo),
                        self.url
                    );
                    drop(repo);
                    std::fs::remove_dir_all(path)?;
                }
                Err(e) => {
                    debug!("Discarding unusable mirror at {}: {}", path.display(), e);
                    std::fs::remove_dir_all(path)?;
                }
            }
        }
        self.clone_bare(path)
    }

    /// Clone the remote as a bare repository at `path`.
    pub fn clone_bare(&self, path: &Path) -> Result<Repository> {
        debug!("Cloning {} into {}", self.url, path.display());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let state = AuthState::default();
        let bar = self.progress_bar("Cloning");
        let result = {
            let mut fo = FetchOptions::new();
            fo.remote_callbacks(self.callbacks(&state, bar.as_ref()));
            RepoBuilder::new()
                .bare(true)
                .remote_create(|repo, name, url| repo.remote_with_fetch(name, url, FETCH_REFSPEC))
                .fetch_options(fo)
                .clone(&self.url, path)
        };
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        result.map_err(|err| {
            if path.exists() {
                let _ = std::fs::remove_dir_all(path);
            }
            state.into_error(self.location, err)
        })
    }

    /// Fetch all branches from `origin`, pruning deleted ones.
    ///
    /// An up-to-date mirror is not an error.
    pub fn fetch(&self, repo: &Repository) -> Result<()> {
        debug!("Fetching updates for {}", self.location);
        let mut remote = repo
            .find_remote("origin")
            .map_err(|source| StencilError::Git {
                location: self.location.to_string(),
                source,
            })?;

        let state = AuthState::default();
        let bar = self.progress_bar("Fetching");
        let result = {
            let mut fo = FetchOptions::new();
            fo.remote_callbacks(self.callbacks(&state, bar.as_ref()));
            fo.prune(FetchPrune::On);
            fo.download_tags(AutotagOption::All);
            remote.fetch(&[FETCH_REFSPEC], Some(&mut fo), None)
        };
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        result.map_err(|err| state.into_error(self.location, err))
    }

    fn progress_bar(&self, action: &str) -> Option<ProgressBar> {
        if !self.verbose {
            return None;
        }
        let bar = ProgressBar::no_length();
        if let Ok(style) =
            ProgressStyle::with_template("{msg} [{bar:30.cyan/dim}] {pos}/{len} objects")
        {
            bar.set_style(style);
        }
        bar.set_message(format!("{action} {}", self.location));
        Some(bar)
    }

    fn callbacks<'b>(
        &'b self,
        state: &'b AuthState,
        bar: Option<&'b ProgressBar>,
    ) -> RemoteCallbacks<'b> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed| {
            let username = username_from_url.unwrap_or("git");
            let Some(credentials) = &self.credentials else {
                state.missing.set(true);
                return Err(git2::Error::from_str("authentication required"));
            };

            if allowed == CredentialType::USERNAME {
                return Cred::username(username);
            }
            if state.supplied.get() {
                state.rejected.set(true);
                return Err(git2::Error::from_str("credentials rejected"));
            }

            let cred = match credentials {
                Credentials::Http(http)
                    if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) =>
                {
                    Cred::userpass_plaintext(&http.username, &http.password)
                }
                Credentials::Ssh(ssh) if allowed.contains(CredentialType::SSH_KEY) => {
                    Cred::ssh_key(
                        username,
                        None,
                        &expand_home(&ssh.private_key_path),
                        ssh.password.as_deref(),
                    )
                }
                _ => {
                    state.rejected.set(true);
                    return Err(git2::Error::from_str(
                        "configured credentials do not match the remote",
                    ));
                }
            };
            state.supplied.set(true);
            cred
        });

        if let Some(bar) = bar {
            callbacks.transfer_progress(move |progress| {
                bar.set_length(progress.total_objects() as u64);
                bar.set_position(progress.received_objects() as u64);
                true
            });
        }

        callbacks
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Resolve `reference` (branch, tag or commit-ish) or the default branch to a commit.
pub fn resolve_commit(
    repo: &Repository,
    location: &str,
    reference: Option<&str>,
) -> Result<git2::Oid> {
    let git_err = |source| StencilError::Git {
        location: location.to_string(),
        source,
    };

    let commit = match reference {
        Some(reference) => repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(git_err)?,
        None => repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(git_err)?,
    };

    debug!(
        "Resolved {}@{} to {}",
        location,
        reference.unwrap_or("HEAD"),
        commit.id()
    );
    Ok(commit.id())
}

/// Read every file of a commit's tree into memory.
pub fn snapshot(repo: &Repository, location: &str, commit: git2::Oid) -> Result<MemoryFs> {
    let git_err = |source| StencilError::Git {
        location: location.to_string(),
        source,
    };

    let tree = repo
        .find_commit(commit)
        .and_then(|c| c.tree())
        .map_err(git_err)?;

    let mut fs = MemoryFs::new();
    let mut trees_and_paths = VecDeque::new();
    trees_and_paths.push_back((tree, PathBuf::new()));

    while let Some((tree, path)) = trees_and_paths.pop_front() {
        for entry in &tree {
            let entry_path = path.join(String::from_utf8_lossy(entry.name_bytes()).as_ref());
            match entry.kind() {
                Some(ObjectType::Tree) => {
                    let subtree = repo.find_tree(entry.id()).map_err(git_err)?;
                    trees_and_paths.push_back((subtree, entry_path));
                }
                Some(ObjectType::Blob) => {
                    let blob = repo.find_blob(entry.id()).map_err(git_err)?;
                    fs.insert(entry_path, blob.content());
                }
                // Submodules are not part of the registry
                _ => continue,
            }
        }
    }

    debug!("Materialized {} files for {}", fs.len(), location);
    Ok(fs)
}

/// URL of the `origin` remote of the bare mirror at `path`, if any.
pub fn origin_url(path: &Path) -> Option<String> {
    let repo = Repository::open_bare(path).ok()?;
    remote_url(&repo)
}

fn remote_url(repo: &Repository) -> Option<String> {
    let remote = repo.find_remote("origin").ok()?;
    remote.url().map(str::to_string)
}
