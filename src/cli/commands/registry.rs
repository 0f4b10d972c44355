//! Registry command implementation.
//!
//! Provides `stencil registry add`, `stencil registry list` and
//! `stencil registry remove`.

use clap::{Args, Subcommand};
use std::fs;

use crate::config::{ComponentIndex, GlobalConfig};
use crate::error::{Result, StencilError};
use crate::registry::{split_reference, Registry, RegistryLocation};
use crate::ui::{Table, UserInterface};

use super::config::{prompt_auth, AuthArgs};
use super::dispatcher::{Command, CommandContext, CommandResult};
use super::open_registry;

/// Arguments for the registry command.
#[derive(Debug, Clone, Args)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistrySubcommand,
}

/// Registry subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum RegistrySubcommand {
    /// Verify access to a registry and remember it.
    Add {
        /// Registry location (path or Git URL, optionally @ref)
        location: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Show known registries and what they contain.
    List,
    /// Forget a registry and drop its cached clone.
    Remove {
        /// Registry location
        location: String,
    },
}

/// The registry command implementation.
pub struct RegistryCommand {
    context: CommandContext,
    args: RegistryArgs,
}

impl RegistryCommand {
    /// Create a new registry command.
    pub fn new(context: CommandContext, args: RegistryArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RegistryArgs {
        &self.args
    }

    fn open(
        &self,
        global: &GlobalConfig,
        location: &str,
        ui: &mut dyn UserInterface,
    ) -> Result<Registry> {
        open_registry(&self.context, global, location, &self.context.project_root, ui)
    }

    fn add(&self, location: &str, auth: &AuthArgs, ui: &mut dyn UserInterface) -> Result<i32> {
        let mut global = self.context.load_global()?;
        let (base, _) = split_reference(location);
        if let Some(auth) = auth.to_auth() {
            global.set_auth(base, auth);
        }

        let registry = open_with_auth_retry(&mut global, base, ui, |global, ui| {
            self.open(global, location, ui)
        })?;
        let index = registry.scan_components()?;

        global.add_registry(base);
        global.save()?;

        ui.success(&format!("Added registry {}", base));
        for (platform, components) in &index {
            ui.message(&format!("  {}: {} components", platform, components.len()));
        }
        Ok(0)
    }

    fn list(&self, ui: &mut dyn UserInterface) -> Result<i32> {
        let global = self.context.load_global()?;
        let locations = global.registry_locations();
        if locations.is_empty() {
            ui.message("No registries configured. Add one with `stencil registry add`.");
            return Ok(0);
        }

        let mut table = Table::new(&["Registry", "Status", "Platforms", "Components"]);
        for location in locations {
            let row = match self.open(&global, location, ui).and_then(|r| r.scan_components()) {
                Ok(index) => vec![
                    location.to_string(),
                    "ok".to_string(),
                    platforms(&index),
                    component_count(&index).to_string(),
                ],
                Err(e) => vec![
                    location.to_string(),
                    status(&e).to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ],
            };
            table.add_row(row);
        }

        ui.message(&table.render());
        Ok(0)
    }

    fn remove(&self, location: &str, ui: &mut dyn UserInterface) -> Result<i32> {
        let mut global = self.context.load_global()?;
        let (base, _) = split_reference(location);
        if !global.remove(base) {
            ui.error(&format!("Registry {} is not configured", base));
            return Ok(1);
        }
        global.save()?;

        if let RegistryLocation::Git(git_location) = RegistryLocation::classify(base) {
            let cache = crate::cache::RegistryCache::new(&self.context.cache_dir, &global);
            let path = cache.repo_path(&git_location);
            if path.exists() {
                fs::remove_dir_all(&path)
                    .map_err(|source| StencilError::FileWrite { path, source })?;
            }
        }

        ui.success(&format!("Removed registry {}", base));
        Ok(0)
    }
}

/// Run `open`; if the remote wants credentials, ask for them and try once more.
fn open_with_auth_retry<F>(
    global: &mut GlobalConfig,
    location: &str,
    ui: &mut dyn UserInterface,
    mut open: F,
) -> Result<Registry>
where
    F: FnMut(&GlobalConfig, &mut dyn UserInterface) -> Result<Registry>,
{
    match open(global, &mut *ui) {
        Err(e) if e.is_auth_required() => {
            ui.warning(&format!("{} requires authentication", location));
            let auth = prompt_auth(ui, location)?;
            global.set_auth(location, auth);
            open(global, &mut *ui)
        }
        other => other,
    }
}

fn platforms(index: &ComponentIndex) -> String {
    index.keys().cloned().collect::<Vec<_>>().join(", ")
}

fn component_count(index: &ComponentIndex) -> usize {
    index.values().map(|components| components.len()).sum()
}

fn status(error: &StencilError) -> &'static str {
    match error {
        StencilError::AuthenticationRequired { .. } => "auth required",
        StencilError::AuthenticationFailed { .. } => "auth failed",
        _ => "error",
    }
}

impl Command for RegistryCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let exit_code = match &self.args.command {
            RegistrySubcommand::Add { location, auth } => self.add(location, auth, ui)?,
            RegistrySubcommand::List => self.list(ui)?,
            RegistrySubcommand::Remove { location } => self.remove(location, ui)?,
        };

        Ok(if exit_code == 0 {
            CommandResult::success()
        } else {
            CommandResult::failure(exit_code)
        })
    }
}
