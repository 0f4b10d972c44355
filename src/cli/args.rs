//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;
use super::commands::config::ConfigArgs;
use super::commands::registry::RegistryArgs;

/// Stencil - Copy reusable components from shared registries into projects.
#[derive(Debug, Parser)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding cached registry clones
    #[arg(long, global = true, env = "STENCIL_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Path to the user-wide config file
    #[arg(long, global = true, env = "STENCIL_GLOBAL_CONFIG")]
    pub global_config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Never prompt; use defaults and STENCIL_PROMPT_* overrides
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or update the project configuration
    Init(InitArgs),

    /// Add a component and its dependencies to the project
    Add(AddArgs),

    /// List components available for the project platform
    List(ListArgs),

    /// Manage known registries
    Registry(RegistryArgs),

    /// Manage registry credentials
    Config(ConfigArgs),

    /// Manage cached registry clones
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Registry location, optionally suffixed with @ref
    #[arg(short, long)]
    pub registry: Option<String>,

    /// Platform to draw components from
    #[arg(short, long)]
    pub platform: Option<String>,
}

/// Arguments for the `add` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AddArgs {
    /// Component to add (prompted for when omitted)
    pub name: Option<String>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output components as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_name() {
        let cli = Cli::parse_from(["stencil", "add", "button"]);
        match cli.command {
            Some(Commands::Add(args)) => assert_eq!(args.name.as_deref(), Some("button")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_init_flags() {
        let cli = Cli::parse_from([
            "stencil",
            "init",
            "--registry",
            "github.com/acme/ui@v1",
            "--platform",
            "web",
        ]);
        match cli.command {
            Some(Commands::Init(args)) => {
                assert_eq!(args.registry.as_deref(), Some("github.com/acme/ui@v1"));
                assert_eq!(args.platform.as_deref(), Some("web"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["stencil", "list", "--verbose", "--non-interactive"]);
        assert!(cli.verbose);
        assert!(cli.non_interactive);
    }

    #[test]
    fn cache_dir_flag() {
        let cli = Cli::parse_from(["stencil", "--cache-dir", "/tmp/c", "cache", "list"]);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/c")));
    }
}
