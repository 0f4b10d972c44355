//! Stencil - copy reusable UI components from shared registries into projects.
//!
//! A registry is a directory tree, local or in a Git repository, holding
//! component manifests (`stencil.yaml`) next to their source files. A project
//! pins one registry and platform in `.stencil.yaml` and adds components from
//! it, with `{{var}}` placeholders in paths and contents filled from the
//! project's variables.
//!
//! # Modules
//!
//! - [`cache`] - Git registry mirrors and location resolution
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Project, global and component configuration
//! - [`error`] - Error types and result aliases
//! - [`registry`] - Registry filesystems, Git transport and lookup
//! - [`scaffold`] - Adding components to a project
//! - [`ui`] - Interactive prompts, spinners, diffs and terminal output
//!
//! # Example
//!
//! ```
//! use stencil::config::{resolve_string, Variables};
//!
//! let mut vars = Variables::new();
//! vars.insert("name".to_string(), "Button".into());
//! let path = resolve_string("src/{{name}}.tsx", &vars).unwrap();
//! assert_eq!(path, "src/Button.tsx");
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod scaffold;
pub mod ui;

pub use error::{Result, StencilError};
