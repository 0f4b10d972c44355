//! Init command implementation.
//!
//! The `stencil init` command pins a registry and platform for the project
//! in the current directory.

use crate::cli::args::InitArgs;
use crate::config::{ComponentIndex, ProjectConfig, PROJECT_FILE};
use crate::error::{Result, StencilError};
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::open_registry;

/// The init command implementation.
pub struct InitCommand {
    context: CommandContext,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(context: CommandContext, args: InitArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &InitArgs {
        &self.args
    }

    /// The config already in the project directory, if any.
    fn existing_config(&self) -> Result<Option<ProjectConfig>> {
        match ProjectConfig::load(&self.context.project_root) {
            Ok(config) => Ok(Some(config)),
            Err(StencilError::ConfigNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn registry_location(
        &self,
        existing: Option<&ProjectConfig>,
        ui: &mut dyn UserInterface,
    ) -> Result<String> {
        if let Some(location) = &self.args.registry {
            return Ok(location.clone());
        }

        let mut prompt = Prompt::new(
            "registry",
            "Registry location (path or Git URL, optionally @ref)",
            PromptType::Input,
        );
        if let Some(config) = existing {
            prompt = prompt.with_default(config.registry.clone());
        }
        let location = ui.prompt(&prompt)?.as_string().trim().to_string();

        if location.is_empty() {
            return Err(StencilError::ConfigValidationError {
                message: "a registry location is required".to_string(),
            });
        }
        Ok(location)
    }

    fn platform(
        &self,
        index: &ComponentIndex,
        existing: Option<&ProjectConfig>,
        ui: &mut dyn UserInterface,
    ) -> Result<String> {
        let platform = match &self.args.platform {
            Some(platform) => platform.clone(),
            None => select_platform(index, existing.map(|c| c.platform.as_str()), ui)?,
        };

        if !index.contains_key(&platform) {
            return Err(StencilError::PlatformNotFound { platform });
        }
        Ok(platform)
    }
}

fn select_platform(
    index: &ComponentIndex,
    current: Option<&str>,
    ui: &mut dyn UserInterface,
) -> Result<String> {
    if index.len() == 1 {
        if let Some(only) = index.keys().next() {
            return Ok(only.clone());
        }
    }

    let options = index
        .iter()
        .map(|(platform, components)| {
            PromptOption::new(
                format!("{} ({} components)", platform, components.len()),
                platform.clone(),
            )
        })
        .collect();

    let default = current
        .filter(|p| index.contains_key(*p))
        .or_else(|| index.keys().next().map(String::as_str))
        .unwrap_or_default()
        .to_string();

    let prompt = Prompt::new("platform", "Platform", PromptType::Select { options })
        .with_default(default);
    Ok(ui.prompt(&prompt)?.as_string())
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.context.project_root;
        let existing = self.existing_config()?;

        let location = self.registry_location(existing.as_ref(), ui)?;
        let global = self.context.load_global()?;
        let registry = open_registry(&self.context, &global, &location, root, ui)?;

        let index = registry.scan_components()?;
        if index.is_empty() {
            return Err(StencilError::ConfigValidationError {
                message: format!("registry {} has no components", location),
            });
        }

        let platform = self.platform(&index, existing.as_ref(), ui)?;

        // Variables survive re-initialisation
        let mut config = existing.unwrap_or_else(|| ProjectConfig::new(root, "", ""));
        config.project_dir = root.clone();
        config.registry = location;
        config.platform = platform;
        config.save()?;

        ui.success(&format!(
            "Wrote {} (registry {}, platform {})",
            PROJECT_FILE, config.registry, config.platform
        ));
        Ok(CommandResult::success())
    }
}
