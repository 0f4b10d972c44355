//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command receives the same
//! [`CommandContext`] built from the global flags.

pub mod add;
pub mod cache;
pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod init;
pub mod list;
pub mod registry;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};

use crate::cache::RegistryCache;
use crate::config::{GlobalConfig, ProjectConfig};
use crate::error::{Result, StencilError};
use crate::registry::Registry;
use crate::ui::UserInterface;
use std::path::Path;

/// Exit code for commands run outside a project.
pub const NO_PROJECT_EXIT_CODE: i32 = 2;

/// Load the nearest project config, reporting its absence to the user.
///
/// Returns `Ok(None)` when no `.stencil.yaml` exists at or above the
/// project root; callers exit with [`NO_PROJECT_EXIT_CODE`].
pub(crate) fn require_project(
    context: &CommandContext,
    ui: &mut dyn UserInterface,
) -> Result<Option<ProjectConfig>> {
    match ProjectConfig::find_nearest(&context.project_root) {
        Ok(project) => Ok(Some(project)),
        Err(StencilError::ConfigNotFound { .. }) => {
            ui.error("No .stencil.yaml found. Run `stencil init` first.");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve a registry location through the cache, with a spinner.
///
/// Relative local locations are taken from `base_dir`.
pub(crate) fn open_registry(
    context: &CommandContext,
    global: &GlobalConfig,
    location: &str,
    base_dir: &Path,
    ui: &mut dyn UserInterface,
) -> Result<Registry> {
    let cache = RegistryCache::new(&context.cache_dir, global).verbose(context.verbose);

    // Transfer progress replaces the spinner in verbose mode
    if context.verbose {
        return cache.open(location, base_dir);
    }

    let mut spinner = ui.start_spinner(&format!("Loading registry {}...", location));
    match cache.open(location, base_dir) {
        Ok(registry) => {
            spinner.finish_clear();
            Ok(registry)
        }
        Err(e) => {
            spinner.finish_error(&format!("Could not load registry {}", location));
            Err(e)
        }
    }
}
