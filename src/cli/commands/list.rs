//! List command implementation.
//!
//! The `stencil list` command shows the components available for the
//! project's platform, grouped by category.

use std::collections::BTreeMap;

use crate::cli::args::ListArgs;
use crate::config::Component;
use crate::error::{Result, StencilError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::{open_registry, require_project, NO_PROJECT_EXIT_CODE};

/// The list command implementation.
pub struct ListCommand {
    context: CommandContext,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: CommandContext, args: ListArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

/// Components by category; uncategorised ones sort first under `None`.
fn group_by_category<'a>(
    components: impl IntoIterator<Item = &'a Component>,
) -> BTreeMap<Option<&'a str>, Vec<&'a Component>> {
    let mut groups: BTreeMap<Option<&str>, Vec<&Component>> = BTreeMap::new();
    for component in components {
        groups
            .entry(component.category.as_deref())
            .or_default()
            .push(component);
    }
    for members in groups.values_mut() {
        members.sort_by(|a, b| a.name.cmp(&b.name));
    }
    groups
}

fn component_line(component: &Component) -> String {
    match &component.description {
        Some(description) => format!("  {} - {}", component.name, description),
        None => format!("  {}", component.name),
    }
}

impl Command for ListCommand {
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
        let components = registry.platform_components(&project.platform)?;

        if self.args.json {
            let listed: Vec<&Component> = components.values().collect();
            let json =
                serde_json::to_string_pretty(&listed).map_err(|e| StencilError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!(
            "Components for {} in {}",
            project.platform,
            registry.name()
        ));

        for (category, members) in group_by_category(components.values()) {
            if let Some(category) = category {
                ui.message("");
                ui.message(&format!("{}:", category));
            }
            for component in members {
                ui.message(&component_line(component));
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{context, write_registry};
    use crate::config::ProjectConfig;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn component(name: &str, category: Option<&str>) -> Component {
        Component {
            name: name.into(),
            category: category.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn uncategorised_group_comes_first() {
        let components = [
            component("slider", Some("inputs")),
            component("card", None),
            component("badge", Some("display")),
            component("avatar", None),
            component("button", Some("inputs")),
        ];
        let groups = group_by_category(components.iter());
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![None, Some("display"), Some("inputs")]);

        let uncategorised: Vec<_> = groups[&None].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(uncategorised, vec!["avatar", "card"]);
        let inputs: Vec<_> = groups[&Some("inputs")]
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(inputs, vec!["button", "slider"]);
    }

    #[test]
    fn lists_platform_components() {
        let temp = TempDir::new().unwrap();
        let registry = write_registry(temp.path());
        ProjectConfig::new(temp.path(), registry.display().to_string(), "web")
            .save()
            .unwrap();

        let cmd = ListCommand::new(context(temp.path(), temp.path()), ListArgs::default());
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.messages(), ["  icon", "", "inputs:", "  button"]);
    }

    #[test]
    fn lists_components_as_json() {
        let temp = TempDir::new().unwrap();
        let registry = write_registry(temp.path());
        ProjectConfig::new(temp.path(), registry.display().to_string(), "web")
            .save()
            .unwrap();

        let cmd = ListCommand::new(
            context(temp.path(), temp.path()),
            ListArgs { json: true },
        );
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        let names: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["button", "icon"]);
    }

    #[test]
    fn missing_project_exits_with_two() {
        let temp = TempDir::new().unwrap();
        let cmd = ListCommand::new(context(temp.path(), temp.path()), ListArgs::default());
        let result = cmd.execute(&mut MockUI::new()).unwrap();
        assert_eq!(result.exit_code, NO_PROJECT_EXIT_CODE);
    }
}
