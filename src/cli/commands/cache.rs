//! Cache command implementation.
//!
//! Provides `stencil cache list` and `stencil cache clear`.

use clap::{Args, Subcommand};

use crate::cache::RegistryCache;
use crate::config::GlobalConfig;
use crate::error::Result;
use crate::ui::{Prompt, PromptType, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached registry clones.
    List,
    /// Remove all cached registry clones.
    Clear {
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
}

/// The cache command implementation.
pub struct CacheCommand {
    context: CommandContext,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(context: CommandContext, args: CacheArgs) -> Self {
        Self { context, args }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Listing and clearing never authenticate
        let global = GlobalConfig::default();
        let cache = RegistryCache::new(&self.context.cache_dir, &global);

        match &self.args.command {
            CacheSubcommand::List => list_cache(&cache, ui)?,
            CacheSubcommand::Clear { force } => clear_cache(&cache, *force, ui)?,
        }

        Ok(CommandResult::success())
    }
}

fn list_cache(cache: &RegistryCache<'_>, ui: &mut dyn UserInterface) -> Result<()> {
    let registries = cache.list_registries()?;

    if registries.is_empty() {
        ui.message("Cache is empty");
        return Ok(());
    }

    ui.message(&format!(
        "{} cached registries in {}:\n",
        registries.len(),
        cache.root().display()
    ));
    for registry in registries {
        ui.message(&format!("  {}", registry));
    }
    Ok(())
}

fn clear_cache(cache: &RegistryCache<'_>, force: bool, ui: &mut dyn UserInterface) -> Result<()> {
    if !force {
        let prompt = Prompt::new(
            "confirm_clear",
            format!("Remove all cached registries in {}?", cache.root().display()),
            PromptType::Confirm,
        )
        .with_default("false");

        if ui.prompt(&prompt)?.as_bool() != Some(true) {
            ui.message("Cancelled");
            return Ok(());
        }
    }

    cache.clear()?;
    ui.success("Cache cleared");
    Ok(())
}
