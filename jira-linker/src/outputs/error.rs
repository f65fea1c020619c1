//! Action output error types.

use thiserror::Error;

/// Errors that can occur while writing action outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to write the outputs file or stdout.
    #[error("Failed to write outputs to {target}: {source}")]
    IoError {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Output names must be non-empty and single-line.
    #[error("Invalid output name '{0}'")]
    InvalidName(String),
}
