//! Config command implementation.
//!
//! `stencil config set-auth` and `stencil config remove-auth` manage the
//! credentials recorded in the user-wide config.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::{HttpAuth, RegistryAuth, SshAuth};
use crate::error::{Result, StencilError};
use crate::registry::split_reference;
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Arguments for the config command.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

/// Config subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigSubcommand {
    /// Store credentials for a registry.
    SetAuth {
        /// Registry location
        location: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Forget the credentials for a registry.
    RemoveAuth {
        /// Registry location
        location: String,
    },
}

/// Credential flags; missing credentials are prompted for.
#[derive(Debug, Clone, Default, Args)]
pub struct AuthArgs {
    /// HTTP username
    #[arg(long, requires = "password", conflicts_with = "private_key")]
    pub username: Option<String>,

    /// HTTP password or access token
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Path to an SSH private key
    #[arg(long)]
    pub private_key: Option<PathBuf>,

    /// Passphrase of the SSH private key
    #[arg(long, requires = "private_key")]
    pub key_password: Option<String>,
}

impl AuthArgs {
    /// Credentials given on the command line, if any.
    pub fn to_auth(&self) -> Option<RegistryAuth> {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return Some(RegistryAuth {
                http: Some(HttpAuth {
                    username: username.clone(),
                    password: password.clone(),
                }),
                ssh: None,
            });
        }
        self.private_key.as_ref().map(|key| RegistryAuth {
            http: None,
            ssh: Some(SshAuth {
                private_key_path: key.clone(),
                password: self.key_password.clone(),
            }),
        })
    }
}

fn ask(
    ui: &mut dyn UserInterface,
    key: &str,
    question: &str,
    prompt_type: PromptType,
) -> Result<String> {
    Ok(ui.prompt(&Prompt::new(key, question, prompt_type))?.as_string())
}

/// Ask for an authentication method and its credentials.
pub(crate) fn prompt_auth(ui: &mut dyn UserInterface, location: &str) -> Result<RegistryAuth> {
    let method = Prompt::new(
        "auth_method",
        format!("Authentication method for {}", location),
        PromptType::Select {
            options: vec![
                PromptOption::new("HTTP username and token", "http"),
                PromptOption::new("SSH private key", "ssh"),
            ],
        },
    )
    .with_default("http");

    match ui.prompt(&method)?.as_string().as_str() {
        "http" => {
            let username = ask(ui, "username", "Username", PromptType::Input)?;
            let password = ask(ui, "password", "Password or token", PromptType::Password)?;
            Ok(RegistryAuth {
                http: Some(HttpAuth { username, password }),
                ssh: None,
            })
        }
        "ssh" => {
            let key = Prompt::new("private_key", "Private key path", PromptType::Input)
                .with_default("~/.ssh/id_ed25519");
            let private_key_path = PathBuf::from(ui.prompt(&key)?.as_string());
            let password = ask(
                ui,
                "key_password",
                "Key passphrase (empty for none)",
                PromptType::Password,
            )?;
            Ok(RegistryAuth {
                http: None,
                ssh: Some(SshAuth {
                    private_key_path,
                    password: Some(password).filter(|p| !p.is_empty()),
                }),
            })
        }
        other => Err(StencilError::ConfigValidationError {
            message: format!("unknown authentication method: {}", other),
        }),
    }
}

/// The config command implementation.
pub struct ConfigCommand {
    context: CommandContext,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(context: CommandContext, args: ConfigArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut global = self.context.load_global()?;

        match &self.args.command {
            ConfigSubcommand::SetAuth { location, auth } => {
                let (location, _) = split_reference(location);
                let auth = match auth.to_auth() {
                    Some(auth) => auth,
                    None => prompt_auth(ui, location)?,
                };
                global.set_auth(location, auth);
                global.save()?;
                ui.success(&format!("Saved credentials for {}", location));
            }
            ConfigSubcommand::RemoveAuth { location } => {
                let (location, _) = split_reference(location);
                if !global.clear_auth(location) {
                    ui.error(&format!("Registry {} is not configured", location));
                    return Ok(CommandResult::failure(1));
                }
                global.save()?;
                ui.success(&format!("Removed credentials for {}", location));
            }
        }

        Ok(CommandResult::success())
    }
}
