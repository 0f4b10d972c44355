//! Integration tests for the stencil binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    temp: TempDir,
}

impl Fixture {
    /// A project directory next to a local registry, with isolated
    /// global config and cache.
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let registry = temp.path().join("registry");
        write(
            &registry.join("web/button/stencil.yaml"),
            "name: button\ncategory: inputs\ndescription: A button\nplatform: web\nfiles:\n  - src: button.tsx.tmpl\n    dst: \"src/{{name}}.tsx\"\ndependencies: [icon]\n",
        );
        write(
            &registry.join("web/button/button.tsx.tmpl"),
            "export const {{name}} = () => <button />;\n",
        );
        write(
            &registry.join("web/icon/stencil.yaml"),
            "name: icon\nplatform: web\nfiles:\n  - src: icon.svg\n    dst: src/icon.svg\n",
        );
        write(&registry.join("web/icon/icon.svg"), "<svg/>\n");
        fs::create_dir_all(temp.path().join("app")).unwrap();
        Self { temp }
    }

    fn project(&self) -> PathBuf {
        self.temp.path().join("app")
    }

    fn write_project_config(&self) {
        write(
            &self.project().join(".stencil.yaml"),
            "registry: ../registry\nplatform: web\nvariables:\n  name: Button\n",
        );
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("stencil"));
        cmd.current_dir(self.project())
            .env("STENCIL_CACHE_DIR", self.temp.path().join("cache"))
            .env("STENCIL_GLOBAL_CONFIG", self.temp.path().join("config.yaml"))
            .env_remove("STENCIL_PROMPT_CONFLICT")
            .arg("--non-interactive");
        cmd
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stencil"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("reusable"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stencil"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_list_without_project_exits_with_two() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("stencil init"));
    Ok(())
}

#[test]
fn cli_init_writes_project_config() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["init", "--registry", "../registry", "--platform", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote .stencil.yaml"));

    let config = fs::read_to_string(fixture.project().join(".stencil.yaml"))?;
    assert!(config.contains("registry: ../registry"));
    assert!(config.contains("platform: web"));
    Ok(())
}

#[test]
fn cli_list_groups_by_category() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.write_project_config();
    fixture
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("inputs:"))
        .stdout(predicate::str::contains("button - A button"))
        .stdout(predicate::str::contains("icon"));
    Ok(())
}

#[test]
fn cli_add_writes_component_and_dependencies() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.write_project_config();
    fixture
        .cmd()
        .args(["add", "button"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Adding dependency icon..."))
        .stdout(predicate::str::contains("Added src/Button.tsx"));

    assert_eq!(
        fs::read_to_string(fixture.project().join("src/Button.tsx"))?,
        "export const Button = () => <button />;\n"
    );
    assert!(fixture.project().join("src/icon.svg").exists());

    fixture
        .cmd()
        .args(["add", "button"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unchanged src/Button.tsx"));
    Ok(())
}

#[test]
fn cli_add_conflict_defaults_to_skip() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.write_project_config();
    write(&fixture.project().join("src/icon.svg"), "mine\n");

    fixture
        .cmd()
        .args(["add", "icon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped src/icon.svg"));
    assert_eq!(fs::read_to_string(fixture.project().join("src/icon.svg"))?, "mine\n");
    Ok(())
}

#[test]
fn cli_add_conflict_answered_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.write_project_config();
    write(&fixture.project().join("src/icon.svg"), "mine\n");

    fixture
        .cmd()
        .env("STENCIL_PROMPT_CONFLICT", "overwrite")
        .args(["add", "icon"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(fixture.project().join("src/icon.svg"))?, "<svg/>\n");
    Ok(())
}

#[test]
fn cli_add_unknown_component_fails() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture.write_project_config();
    fixture
        .cmd()
        .args(["add", "slider"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Component slider not found"));
    Ok(())
}

#[test]
fn cli_cache_list_empty() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
    Ok(())
}

#[test]
fn cli_registry_add_and_list() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["registry", "add", "../registry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web: 2 components"));

    fixture
        .cmd()
        .args(["registry", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("../registry"))
        .stdout(predicate::str::contains("ok"));
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stencil"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("stencil"));
    Ok(())
}
