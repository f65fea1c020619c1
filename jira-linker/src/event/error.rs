//! Event context error types.

use thiserror::Error;

/// Errors that can occur while reading the GitHub event.
#[derive(Debug, Error)]
pub enum EventError {
    /// Failed to read the event file.
    #[error("Failed to read event file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The event file is not valid JSON for a GitHub event.
    #[error("Failed to parse event file '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
