//! Jira connection settings.

use crate::config::{ConfigError, FileConfig};
use std::fmt;
use tracing::debug;
use url::Url;

const BASE_URL_ENV: &str = "JIRA_BASE_URL";
const EMAIL_ENV: &str = "JIRA_USER_EMAIL";
const TOKEN_ENV: &str = "JIRA_API_TOKEN";

/// Jira settings as supplied on the command line, before resolution.
#[derive(Debug, Clone, Default)]
pub struct JiraArgs {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
}

/// Validated Jira connection settings.
#[derive(Clone)]
pub struct JiraSettings {
    base_url: Url,
    email: String,
    token: String,
}

impl JiraSettings {
    /// Creates settings from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if a value is empty or the
    /// base URL is not an http(s) URL.
    pub fn new(base_url: &str, email: &str, token: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        let email = non_empty("Jira user email", email)?;
        let token = non_empty("Jira API token", token)?;
        Ok(Self {
            base_url,
            email,
            token,
        })
    }

    /// Resolves settings from, in order of precedence, explicit arguments,
    /// the `JIRA_*` environment variables and the config file.
    ///
    /// The resolved base URL must use `https`, except on a loopback host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] if a value is not supplied
    /// anywhere, or [`ConfigError::ValidationError`] if it is unusable.
    pub fn resolve(args: &JiraArgs, file: Option<&FileConfig>) -> Result<Self, ConfigError> {
        let base_url = pick(
            args.base_url.as_deref(),
            BASE_URL_ENV,
            file.and_then(|f| f.base_url.as_deref()),
        )
        .ok_or(ConfigError::MissingSetting {
            name: "Jira base URL",
            flag: "jira-base-url",
            env: BASE_URL_ENV,
        })?;
        let email = pick(
            args.email.as_deref(),
            EMAIL_ENV,
            file.and_then(|f| f.email.as_deref()),
        )
        .ok_or(ConfigError::MissingSetting {
            name: "Jira user email",
            flag: "jira-user-email",
            env: EMAIL_ENV,
        })?;
        let token = pick(
            args.token.as_deref(),
            TOKEN_ENV,
            file.and_then(|f| f.token.as_deref()),
        )
        .ok_or(ConfigError::MissingSetting {
            name: "Jira API token",
            flag: "jira-api-token",
            env: TOKEN_ENV,
        })?;

        let settings = Self::new(&base_url, &email, &token)?;
        if settings.base_url.scheme() != "https" && !is_loopback(&settings.base_url) {
            return Err(ConfigError::ValidationError {
                name: "Jira base URL".to_string(),
                message: format!("'{}' must use https", settings.base_url),
            });
        }

        debug!(base_url = %settings.base_url, email = %settings.email, "Resolved Jira settings");
        Ok(settings)
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("base_url", &self.base_url.as_str())
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// First non-blank value of the argument, the environment variable and the file.
fn pick(arg: Option<&str>, env: &str, file: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env).ok();
    let picked = [arg, env_value.as_deref(), file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string);
    picked
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| ConfigError::ValidationError {
        name: "Jira base URL".to_string(),
        message: format!("'{raw}' is not a valid URL: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError {
            name: "Jira base URL".to_string(),
            message: format!("'{raw}' must be an http or https URL"),
        });
    }
    Ok(url)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn non_empty(name: &str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::ValidationError {
            name: name.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ENV: [(&str, Option<&str>); 3] =
        [(BASE_URL_ENV, None), (EMAIL_ENV, None), (TOKEN_ENV, None)];

    fn full_args() -> JiraArgs {
        JiraArgs {
            base_url: Some("https://example.atlassian.net/".to_string()),
            email: Some("bot@example.com".to_string()),
            token: Some("secret".to_string()),
        }
    }

    #[test]
    fn resolves_explicit_arguments() {
        temp_env::with_vars(ALL_ENV, || {
            let settings = JiraSettings::resolve(&full_args(), None).unwrap();
            assert_eq!(settings.base_url(), "https://example.atlassian.net");
            assert_eq!(settings.email(), "bot@example.com");
            assert_eq!(settings.token(), "secret");
        });
    }

    #[test]
    fn environment_overrides_file() {
        let file = FileConfig {
            base_url: Some("https://file.atlassian.net".to_string()),
            email: Some("file@example.com".to_string()),
            token: Some("file-token".to_string()),
            ..FileConfig::default()
        };

        temp_env::with_vars(
            [
                (BASE_URL_ENV, Some("https://env.atlassian.net")),
                (EMAIL_ENV, None),
                (TOKEN_ENV, Some("env-token")),
            ],
            || {
                let settings = JiraSettings::resolve(&JiraArgs::default(), Some(&file)).unwrap();
                assert_eq!(settings.base_url(), "https://env.atlassian.net");
                assert_eq!(settings.email(), "file@example.com");
                assert_eq!(settings.token(), "env-token");
            },
        );
    }

    #[test]
    fn missing_token_is_reported() {
        temp_env::with_vars(ALL_ENV, || {
            let args = JiraArgs {
                token: Some("   ".to_string()),
                ..full_args()
            };
            let result = JiraSettings::resolve(&args, None);
            assert!(matches!(
                result,
                Err(ConfigError::MissingSetting { env: TOKEN_ENV, .. })
            ));
        });
    }

    #[test]
    fn requires_https() {
        temp_env::with_vars(ALL_ENV, || {
            let args = JiraArgs {
                base_url: Some("http://example.atlassian.net".to_string()),
                ..full_args()
            };
            let result = JiraSettings::resolve(&args, None);
            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
        });
    }

    #[test]
    fn allows_http_on_loopback() {
        temp_env::with_vars(ALL_ENV, || {
            let args = JiraArgs {
                base_url: Some("http://127.0.0.1:8080".to_string()),
                ..full_args()
            };
            let settings = JiraSettings::resolve(&args, None).unwrap();
            assert_eq!(settings.base_url(), "http://127.0.0.1:8080");
        });
    }

    #[test]
    fn rejects_invalid_urls() {
        let result = JiraSettings::new("not a url", "bot@example.com", "secret");
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn debug_output_hides_token() {
        let settings =
            JiraSettings::new("https://example.atlassian.net", "bot@example.com", "secret")
                .unwrap();
        assert!(!format!("{settings:?}").contains("secret"));
    }
}
