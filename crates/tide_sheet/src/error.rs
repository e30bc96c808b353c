//! Sheet error types

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a presentation request did not start
#[derive(Error, Debug)]
pub enum PresentError {
    /// A sheet is already on screen; the request is ignored
    #[error("A sheet is already being presented")]
    AlreadyPresenting,

    /// No overlay scene has been attached to the presenter yet
    #[error("No overlay surface available")]
    NoOverlaySurface,

    /// The presenting surface is not on screen (caller bug)
    #[error("Presenting surface is not visible")]
    HostNotVisible,
}

impl PresentError {
    /// Whether the error is a benign no-op rather than a caller bug
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            PresentError::AlreadyPresenting | PresentError::NoOverlaySurface
        )
    }
}

/// Result type for presentation operations
pub type Result<T> = std::result::Result<T, PresentError>;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but violate an ordering or range constraint
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
