//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading configuration.
///
/// Any of these stops the run before issue keys are extracted or fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse config file '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A setting has an unusable value.
    #[error("Invalid {name}: {message}")]
    ValidationError { name: String, message: String },

    /// A required setting was not supplied anywhere.
    #[error("{name} not set; pass --{flag}, set {env} or add it to the config file")]
    MissingSetting {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    /// Missing required file.
    #[error("Missing required file: {path}")]
    MissingFile { path: String },
}
