//! Optional TOML config file.

use crate::config::ConfigError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Parsed contents of a config file. Every key is optional; values given on
/// the command line or in the environment take precedence.
///
/// ```toml
/// base-url = "https://example.atlassian.net"
/// email = "bot@example.com"
/// token = "..."
/// transition-chain = "Start Progress,Review,Done"
/// issue-title-format = "{{key}}: {{summary}}"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// Jira base URL.
    pub base_url: Option<String>,

    /// Jira user email.
    pub email: Option<String>,

    /// Jira API token.
    pub token: Option<String>,

    /// Text to scan for issue keys.
    pub string: Option<String>,

    /// Comma-delimited Jira transition chain.
    pub transition_chain: Option<String>,

    /// Handlebars format for mirrored GitHub issue titles.
    #[serde(default = "default_issue_title_format")]
    pub issue_title_format: String,

    /// Handlebars format for mirrored GitHub issue bodies.
    #[serde(default = "default_issue_body_format")]
    pub issue_body_format: String,

    /// Handlebars format for one line of the linked issue list.
    #[serde(default = "default_issue_line_format")]
    pub issue_line_format: String,
}

impl FileConfig {
    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            token: None,
            string: None,
            transition_chain: None,
            issue_title_format: default_issue_title_format(),
            issue_body_format: default_issue_body_format(),
            issue_line_format: default_issue_line_format(),
        }
    }
}

#[must_use]
pub fn default_issue_title_format() -> String {
    "{{key}}: {{summary}}".to_string()
}

#[must_use]
pub fn default_issue_body_format() -> String {
    "{{#if description}}{{description}}\n\n{{/if}}Jira: [{{key}}]({{url}})".to_string()
}

#[must_use]
pub fn default_issue_line_format() -> String {
    "*  **[{{key}}]({{url}})** [{{#if status}}{{status}}{{else}}Jira Status Unknown{{/if}}] {{summary}}{{#if github_number}} (Fix: #{{github_number}}){{/if}}".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_settings_and_default_formats() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jira.toml");
        fs::write(
            &path,
            r#"
base-url = "https://example.atlassian.net"
email = "bot@example.com"
transition-chain = "Start,Done"
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();

        assert_eq!(
            config.base_url.as_deref(),
            Some("https://example.atlassian.net")
        );
        assert_eq!(config.email.as_deref(), Some("bot@example.com"));
        assert_eq!(config.token, None);
        assert_eq!(config.transition_chain.as_deref(), Some("Start,Done"));
        assert_eq!(config.issue_title_format, default_issue_title_format());
    }

    #[test]
    fn loads_custom_formats() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jira.toml");
        fs::write(&path, "issue-title-format = \"[{{key}}] {{summary}}\"\n").unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.issue_title_format, "[{{key}}] {{summary}}");
        assert_eq!(config.issue_line_format, default_issue_line_format());
    }

    #[test]
    fn rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jira.toml");
        fs::write(&path, "baseUrl = \"https://example.atlassian.net\"\n").unwrap();

        let result = FileConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let result = FileConfig::load(&temp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
