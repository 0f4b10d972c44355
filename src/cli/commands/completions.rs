//! `stencil completions SHELL`: print a shell completion script.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Writes the completion script for one shell.
pub struct CompletionsCommand {
    shell: Shell,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { shell: args.shell }
    }

    /// Generate the script into `out`, named after the binary.
    pub fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        let mut script = Vec::new();
        clap_complete::generate(self.shell, &mut cmd, bin_name, &mut script);
        out.write_all(&script)?;
        out.flush()?;
        Ok(())
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.write_to(&mut io::stdout().lock())?;
        Ok(CommandResult::success())
    }
}
