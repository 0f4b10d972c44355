//! Adding components and their dependencies to a project.

use crate::config::interpolation::resolve_string;
use crate::config::ProjectConfig;
use crate::error::{Result, StencilError};
use crate::registry::Registry;
use crate::scaffold::conflict::{resolve_conflict, Resolution};
use crate::ui::UserInterface;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component as PathComponent, Path, PathBuf};
use tracing::debug;

/// What happened to one destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file did not exist and was written.
    Added,
    /// The file already had the resolved content.
    Unchanged,
    /// The file differs and was left alone.
    Skipped,
    /// The file differed and was replaced.
    Overwritten,
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Added => "Added",
            Self::Unchanged => "Unchanged",
            Self::Skipped => "Skipped",
            Self::Overwritten => "Overwrite",
        };
        f.write_str(label)
    }
}

/// Everything an add operation did, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Components added, root first.
    pub components: Vec<String>,
    /// Destination files (relative to the project) and their outcome.
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl AddReport {
    /// Number of files with the given outcome.
    pub fn count(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// Outcome recorded for `path`, if any.
    pub fn outcome(&self, path: impl AsRef<Path>) -> Option<FileOutcome> {
        self.files
            .iter()
            .find(|(p, _)| p == path.as_ref())
            .map(|(_, o)| *o)
    }
}

/// Adds components from a registry into a project.
pub struct ComponentAdder<'a> {
    project: &'a ProjectConfig,
    registry: &'a Registry,
    ui: &'a mut dyn UserInterface,
    report: AddReport,
}

impl<'a> ComponentAdder<'a> {
    pub fn new(
        project: &'a ProjectConfig,
        registry: &'a Registry,
        ui: &'a mut dyn UserInterface,
    ) -> Self {
        Self {
            project,
            registry,
            ui,
            report: AddReport::default(),
        }
    }

    /// Add `name` and, transitively, its dependencies.
    ///
    /// Components already in `added` are skipped, which also ends dependency
    /// cycles. Destination paths are validated for the whole component
    /// before any of its files is written; a missing content variable stops
    /// the operation at that file.
    pub fn add(&mut self, name: &str, added: &mut HashSet<String>) -> Result<()> {
        self.add_component(name, added, false)
    }

    /// The report so far.
    pub fn report(&self) -> &AddReport {
        &self.report
    }

    /// Consume the adder, returning its report.
    pub fn into_report(self) -> AddReport {
        self.report
    }

    fn add_component(
        &mut self,
        name: &str,
        added: &mut HashSet<String>,
        is_dependency: bool,
    ) -> Result<()> {
        if added.contains(name) {
            debug!("Component {} already added", name);
            return Ok(());
        }

        let component = self
            .registry
            .resolve_component(&self.project.platform, name)?;
        let files = component.resolve_files(&self.project.variables)?;
        let mut targets = Vec::with_capacity(files.len());
        for file in &files {
            let dst =
                destination_path(&file.dst).ok_or_else(|| StencilError::InvalidComponent {
                    path: component.path.clone(),
                    message: format!("destination {} leaves the project directory", file.dst),
                })?;
            targets.push((component.source_path(&file.src), dst));
        }

        let kind = if is_dependency {
            "dependency"
        } else {
            "component"
        };
        self.ui.message(&format!("Adding {} {}...", kind, name));

        for (src_path, dst) in targets {
            let source = self.registry.read_file(&src_path)?;
            let content = self.render_content(source)?;

            let outcome = self.write_file(&dst, &content)?;
            self.report_file(dst, outcome);
        }

        added.insert(name.to_string());
        self.report.components.push(name.to_string());

        for dependency in &component.dependencies {
            self.add_component(dependency, added, true)?;
        }

        Ok(())
    }

    /// Substitute variables into text content. Binary content is copied as is.
    fn render_content(&self, source: Vec<u8>) -> Result<Vec<u8>> {
        match String::from_utf8(source) {
            Ok(text) => Ok(resolve_string(&text, &self.project.variables)?.into_bytes()),
            Err(e) => Ok(e.into_bytes()),
        }
    }

    fn write_file(&mut self, dst: &Path, content: &[u8]) -> Result<FileOutcome> {
        let full_path = self.project.project_dir.join(dst);

        if full_path.exists() {
            let existing = fs::read(&full_path).map_err(|source| StencilError::FileRead {
                path: full_path.clone(),
                source,
            })?;

            if existing == content {
                return Ok(FileOutcome::Unchanged);
            }

            return match resolve_conflict(&mut *self.ui, dst, &existing, content)? {
                Resolution::Skip => Ok(FileOutcome::Skipped),
                Resolution::Overwrite => {
                    write_bytes(&full_path, content)?;
                    Ok(FileOutcome::Overwritten)
                }
            };
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StencilError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_bytes(&full_path, content)?;
        Ok(FileOutcome::Added)
    }

    fn report_file(&mut self, dst: PathBuf, outcome: FileOutcome) {
        let line = format!("  {} {}", outcome, dst.display());
        match outcome {
            FileOutcome::Added | FileOutcome::Overwritten => self.ui.success(&line),
            FileOutcome::Unchanged | FileOutcome::Skipped => self.ui.message(&line),
        }
        self.report.files.push((dst, outcome));
    }
}

fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content).map_err(|source| StencilError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Destination relative to the project root; leading roots are dropped.
///
/// Returns `None` if the path climbs out with `..`.
fn destination_path(dst: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(dst).components() {
        match component {
            PathComponent::RootDir | PathComponent::Prefix(_) | PathComponent::CurDir => {}
            PathComponent::ParentDir => return None,
            PathComponent::Normal(part) => path.push(part),
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryFs;
    use crate::ui::MockUI;
    use serde_yaml::Value;
    use tempfile::TempDir;

    fn registry() -> Registry {
        let mut fs = MemoryFs::new();
        fs.insert(
            "web/button/stencil.yaml",
            "name: button\nplatform: web\nfiles:\n  - src: button.tsx.tmpl\n    dst: \"{{name}}.tsx\"\ndependencies:\n  - icon\n",
        );
        fs.insert(
            "web/button/button.tsx.tmpl",
            "export const {{name}} = () => null;\n",
        );
        fs.insert(
            "web/icon/stencil.yaml",
            "name: icon\nplatform: web\nfiles:\n  - src: icon.svg\n    dst: /assets/icon.svg\n",
        );
        fs.insert("web/icon/icon.svg", vec![0xff, 0xfe, 0x00, b'<']);
        Registry::snapshot("example.com/ui", None, "0000000", fs)
    }

    fn project(dir: &Path) -> ProjectConfig {
        let mut config = ProjectConfig::new(dir, "example.com/ui", "web");
        config.variables.insert("name".into(), Value::from("Button"));
        config
    }

    #[test]
    fn adds_component_with_dependency() {
        let temp = TempDir::new().unwrap();
        let project = project(temp.path());
        let registry = registry();
        let mut ui = MockUI::new();

        let mut adder = ComponentAdder::new(&project, &registry, &mut ui);
        let mut added = HashSet::new();
        adder.add("button", &mut added).unwrap();
        let report = adder.into_report();

        assert_eq!(report.components, vec!["button", "icon"]);
        assert_eq!(report.outcome("Button.tsx"), Some(FileOutcome::Added));
        assert_eq!(report.outcome("assets/icon.svg"), Some(FileOutcome::Added));
        assert_eq!(
            fs::read_to_string(temp.path().join("Button.tsx")).unwrap(),
            "export const Button = () => null;\n"
        );
        assert_eq!(
            fs::read(temp.path().join("assets/icon.svg")).unwrap(),
            vec![0xff, 0xfe, 0x00, b'<']
        );
        assert!(ui.has_message("Adding component button..."));
        assert!(ui.has_message("Adding dependency icon..."));
        assert!(ui.has_success("Added Button.tsx"));
    }

    #[test]
    fn already_added_components_are_skipped() {
        let temp = TempDir::new().unwrap();
        let project = project(temp.path());
        let registry = registry();
        let mut ui = MockUI::new();

        let mut added: HashSet<String> = ["button".to_string()].into_iter().collect();
        let mut adder = ComponentAdder::new(&project, &registry, &mut ui);
        adder.add("button", &mut added).unwrap();
        assert!(adder.report().files.is_empty());
        assert!(!temp.path().join("Button.tsx").exists());
    }

    #[test]
    fn destination_path_drops_root() {
        assert_eq!(destination_path("/a/b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(destination_path("./a/b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(destination_path("a/../../b.txt"), None);
    }

    #[test]
    fn destination_outside_project_is_rejected_before_writing() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("app");
        let mut project = project(&project_dir);
        project.variables.insert("dir".into(), Value::from("../../outside"));

        let mut fs = MemoryFs::new();
        fs.insert(
            "web/card/stencil.yaml",
            "name: card\nplatform: web\nfiles:\n  - src: card.txt\n    dst: card.txt\n  - src: card.txt\n    dst: \"{{dir}}/card.txt\"\n",
        );
        fs.insert("web/card/card.txt", "card\n");
        let registry = Registry::snapshot("example.com/ui", None, "0000000", fs);

        let mut ui = MockUI::new();
        let mut adder = ComponentAdder::new(&project, &registry, &mut ui);
        let err = adder.add("card", &mut HashSet::new()).unwrap_err();

        assert!(matches!(err, StencilError::InvalidComponent { .. }));
        assert!(err.to_string().contains("leaves the project directory"));
        assert!(!project_dir.join("card.txt").exists());
        assert!(!temp.path().join("outside").exists());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(FileOutcome::Added.to_string(), "Added");
        assert_eq!(FileOutcome::Overwritten.to_string(), "Overwrite");
    }

    #[test]
    fn report_counts_outcomes() {
        let report = AddReport {
            components: vec!["a".into()],
            files: vec![
                ("x".into(), FileOutcome::Added),
                ("y".into(), FileOutcome::Added),
                ("z".into(), FileOutcome::Skipped),
            ],
        };
        assert_eq!(report.count(FileOutcome::Added), 2);
        assert_eq!(report.count(FileOutcome::Unchanged), 0);
    }
}
