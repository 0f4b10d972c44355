//! Configuration models for Stencil.
//!
//! - Variable interpolation in [`interpolation`]
//! - Component manifests and registry scanning in [`component`]
//! - Per-project settings (`.stencil.yaml`) in [`project`]
//! - User-wide registries and credentials in [`global`]
//!
//! # Example
//!
//! ```
//! use stencil::config::{resolve_string, Variables};
//!
//! let mut vars = Variables::new();
//! vars.insert("name".into(), "Button".into());
//! let dst = resolve_string("src/{{name}}.tsx", &vars).unwrap();
//! assert_eq!(dst, "src/Button.tsx");
//! ```

pub mod component;
pub mod global;
pub mod interpolation;
pub mod project;

pub use component::{
    load_component, scan_components, Component, ComponentFile, ComponentIndex, Preview,
    ResolvedFile, MANIFEST_FILE,
};
pub use global::{
    default_global_config_path, Credentials, GlobalConfig, HttpAuth, RegistryAuth, SshAuth,
};
pub use interpolation::{
    find_variables, has_interpolation, resolve_string, value_to_string, Variables,
};
pub use project::{find_project_dir, ProjectConfig, PROJECT_FILE};
