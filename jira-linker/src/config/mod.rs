//! Configuration loading.
//!
//! Settings come from command-line arguments, `JIRA_*` environment variables
//! and an optional TOML config file, in that order of precedence.

mod error;
mod file;
mod jira;

pub use error::ConfigError;
pub use file::{
    default_issue_body_format, default_issue_line_format, default_issue_title_format, FileConfig,
};
pub use jira::{JiraArgs, JiraSettings};

use std::path::Path;
use tracing::info;

/// Loads the config file at `path`, if one was given.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] if `path` does not exist, or any
/// error from [`FileConfig::load`].
pub fn load_config_file(path: Option<&Path>) -> Result<Option<FileConfig>, ConfigError> {
    let Some(path) = path else {
        return Ok(None);
    };

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let config = FileConfig::load(path)?;
    info!(path = %path.display(), "Loaded config file");
    Ok(Some(config))
}
