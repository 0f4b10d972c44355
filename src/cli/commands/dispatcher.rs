//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for settings shared by all commands
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cache::default_cache_dir;
use crate::cli::args::{Cli, Commands, ListArgs};
use crate::config::{default_global_config_path, GlobalConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Settings derived from the global flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Directory the command runs in; project configs are searched from here.
    pub project_root: PathBuf,

    /// Root of the registry clone cache.
    pub cache_dir: PathBuf,

    /// Path of the user-wide config file.
    pub global_config_path: PathBuf,

    /// Show Git transfer progress.
    pub verbose: bool,
}

impl CommandContext {
    /// Context rooted at `project_root` with default cache and config paths.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            cache_dir: default_cache_dir(),
            global_config_path: default_global_config_path(),
            verbose: false,
        }
    }

    /// Context for a parsed command line.
    pub fn from_cli(cli: &Cli, project_root: impl Into<PathBuf>) -> Self {
        let mut context = Self::new(project_root);
        if let Some(dir) = &cli.cache_dir {
            context.cache_dir = dir.clone();
        }
        if let Some(path) = &cli.global_config {
            context.global_config_path = path.clone();
        }
        context.verbose = cli.verbose;
        context
    }

    /// Load the user-wide config.
    pub fn load_global(&self) -> Result<GlobalConfig> {
        GlobalConfig::load(&self.global_config_path)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given context.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.context.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. Without a subcommand the project's components are
    /// listed.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let context = self.context.clone();
        match &cli.command {
            Some(Commands::Init(args)) => {
                super::init::InitCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Add(args)) => {
                super::add::AddCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::List(args)) => {
                super::list::ListCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Registry(args)) => {
                super::registry::RegistryCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Config(args)) => {
                super::config::ConfigCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Cache(args)) => {
                super::cache::CacheCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::list::ListCommand::new(context, ListArgs::default()).execute(ui),
        }
    }
}
