//! Add command implementation.
//!
//! The `stencil add` command copies a component and its dependencies into
//! the project.

use std::collections::HashSet;

use crate::cli::args::AddArgs;
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::registry::Registry;
use crate::scaffold::{AddReport, ComponentAdder, FileOutcome};
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::{open_registry, require_project, NO_PROJECT_EXIT_CODE};

/// The add command implementation.
pub struct AddCommand {
    context: CommandContext,
    args: AddArgs,
}

impl AddCommand {
    /// Create a new add command.
    pub fn new(context: CommandContext, args: AddArgs) -> Self {
        Self { context, args }
    }

    fn component_name(
        &self,
        project: &ProjectConfig,
        registry: &Registry,
        ui: &mut dyn UserInterface,
    ) -> Result<String> {
        if let Some(name) = &self.args.name {
            return Ok(name.clone());
        }

        let components = registry.platform_components(&project.platform)?;
        let options = components
            .values()
            .map(|c| PromptOption::new(c.display_title(), c.name.clone()))
            .collect();
        let prompt = Prompt::new("component", "Component to add", PromptType::Select { options });
        Ok(ui.prompt(&prompt)?.as_string())
    }
}

fn summarize(report: &AddReport) -> String {
    let mut parts = vec![format!("{} added", report.count(FileOutcome::Added))];
    for (outcome, label) in [
        (FileOutcome::Overwritten, "overwritten"),
        (FileOutcome::Unchanged, "unchanged"),
        (FileOutcome::Skipped, "skipped"),
    ] {
        let count = report.count(outcome);
        if count > 0 {
            parts.push(format!("{} {}", count, label));
        }
    }
    format!(
        "Added {} ({} files: {})",
        report.components.join(", "),
        report.files.len(),
        parts.join(", ")
    )
}

impl Command for AddCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(project) = require_project(&self.context, ui)? else {
            return Ok(CommandResult::failure(NO_PROJECT_EXIT_CODE));
        };

        let global = self.context.load_global()?;
        let registry = open_registry(
            &self.context,
            &global,
            &project.registry,
            &project.project_dir,
            ui,
        )?;
        let name = self.component_name(&project, &registry, ui)?;

        let mut added = HashSet::new();
        let mut adder = ComponentAdder::new(&project, &registry, ui);
        adder.add(&name, &mut added)?;
        let report = adder.into_report();

        ui.success(&summarize(&report));
        Ok(CommandResult::success())
    }
}
