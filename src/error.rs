//! Error types for Stencil operations.
//!
//! This module defines [`StencilError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `StencilError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `StencilError::Other`) for unexpected errors
//! - Messages name the entity that is missing or broken

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Stencil operations.
#[derive(Debug, Error)]
pub enum StencilError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A component manifest is malformed or misses required fields.
    #[error("Invalid component at {path}: {message}")]
    InvalidComponent { path: PathBuf, message: String },

    /// Two manifests declare the same platform and name.
    #[error("Duplicate component {name} found in platform {platform} at {path}")]
    DuplicateComponent {
        platform: String,
        name: String,
        path: PathBuf,
    },

    /// The registry has no components for the platform.
    #[error("No components found for platform {platform}")]
    PlatformNotFound { platform: String },

    /// The platform exists but the component does not.
    #[error("Component {name} not found in platform {platform}")]
    ComponentNotFound { platform: String, name: String },

    /// A placeholder references a variable that has no binding.
    #[error("Variable {name} not defined")]
    UndefinedVariable { name: String },

    /// The remote rejected anonymous access.
    #[error("Authentication required for registry {location}")]
    AuthenticationRequired { location: String },

    /// The remote rejected the configured credentials.
    #[error("Authentication failed for registry {location}")]
    AuthenticationFailed { location: String },

    /// Clone, fetch or checkout failed.
    #[error("Git operation failed for {location}: {source}")]
    Git {
        location: String,
        #[source]
        source: git2::Error,
    },

    /// Reading a file failed.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A destination conflict ended without a decision.
    #[error("Destination file already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StencilError {
    /// Whether this error means the remote wants credentials.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired { .. })
    }
}

/// Result type alias for Stencil operations.
pub type Result<T> = std::result::Result<T, StencilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = StencilError::ConfigNotFound {
            path: PathBuf::from("/foo/.stencil.yaml"),
        };
        assert!(err.to_string().contains("/foo/.stencil.yaml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = StencilError::ConfigParseError {
            path: PathBuf::from("/config.yaml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yaml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn duplicate_component_names_platform_and_name() {
        let err = StencilError::DuplicateComponent {
            platform: "web".into(),
            name: "card".into(),
            path: PathBuf::from("b/card"),
        };
        let msg = err.to_string();
        assert!(msg.contains("web"));
        assert!(msg.contains("card"));
        assert!(msg.contains("b/card"));
    }

    #[test]
    fn lookup_errors_carry_the_failing_level() {
        let platform = StencilError::PlatformNotFound {
            platform: "mobile".into(),
        };
        let component = StencilError::ComponentNotFound {
            platform: "web".into(),
            name: "card".into(),
        };
        assert!(platform.to_string().contains("platform mobile"));
        assert!(component.to_string().contains("Component card"));
    }

    #[test]
    fn undefined_variable_displays_name() {
        let err = StencilError::UndefinedVariable {
            name: "name".into(),
        };
        assert_eq!(err.to_string(), "Variable name not defined");
    }

    #[test]
    fn auth_required_is_distinguished() {
        let required = StencilError::AuthenticationRequired {
            location: "github.com/org/repo".into(),
        };
        let failed = StencilError::AuthenticationFailed {
            location: "github.com/org/repo".into(),
        };
        assert!(required.is_auth_required());
        assert!(!failed.is_auth_required());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StencilError = io_err.into();
        assert!(matches!(err, StencilError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(StencilError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
