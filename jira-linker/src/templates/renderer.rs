//! Template renderer.

use super::TemplateError;
use crate::config::FileConfig;
use crate::reconcile::IssueRecord;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Value};

const ISSUE_TITLE: &str = "issue_title";
const ISSUE_BODY: &str = "issue_body";
const ISSUE_LINE: &str = "issue_line";
const RELEASE_NOTES: &str = "release_notes";

const RELEASE_NOTES_FORMAT: &str = "### Release Notes:\n\n{{list}}";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Usage: `{{#if (eq status "Done")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Renders issue list lines, release notes and mirrored GitHub issues.
///
/// Every template sees `key`, `summary`, `description`, `url`, `status` and
/// `github_number`; absent values are `null`.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Creates a renderer with the formats from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RegistrationError`] if a format does not parse.
    pub fn new(config: &FileConfig) -> Result<Self, TemplateError> {
        let mut handlebars = create_handlebars_registry();
        for (name, format) in [
            (ISSUE_TITLE, config.issue_title_format.as_str()),
            (ISSUE_BODY, config.issue_body_format.as_str()),
            (ISSUE_LINE, config.issue_line_format.as_str()),
            (RELEASE_NOTES, RELEASE_NOTES_FORMAT),
        ] {
            handlebars
                .register_template_string(name, format)
                .map_err(|e| TemplateError::RegistrationError {
                    name,
                    source: Box::new(e),
                })?;
        }
        Ok(Self { handlebars })
    }

    /// Renders one line of the linked issue list.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue_line(
        &self,
        record: &IssueRecord,
        url: &str,
    ) -> Result<String, TemplateError> {
        self.render(ISSUE_LINE, &issue_data(record, url))
    }

    /// Renders the linked issue list, one line per record.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue_list<F>(
        &self,
        records: &[IssueRecord],
        url_for: F,
    ) -> Result<String, TemplateError>
    where
        F: Fn(&IssueRecord) -> String,
    {
        let lines = records
            .iter()
            .map(|record| self.render_issue_line(record, &url_for(record)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Renders release notes around an already rendered issue list.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_release_notes(&self, list: &str) -> Result<String, TemplateError> {
        self.render(RELEASE_NOTES, &json!({ "list": list }))
    }

    /// Renders the title of a mirrored GitHub issue.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue_title(
        &self,
        record: &IssueRecord,
        url: &str,
    ) -> Result<String, TemplateError> {
        self.render(ISSUE_TITLE, &issue_data(record, url))
    }

    /// Renders the body of a mirrored GitHub issue.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue_body(
        &self,
        record: &IssueRecord,
        url: &str,
    ) -> Result<String, TemplateError> {
        self.render(ISSUE_BODY, &issue_data(record, url))
    }

    fn render(&self, name: &str, data: &Value) -> Result<String, TemplateError> {
        Ok(self.handlebars.render(name, data)?)
    }
}

fn issue_data(record: &IssueRecord, url: &str) -> Value {
    json!({
        "key": record.key.as_str(),
        "summary": record.summary,
        "description": record.description,
        "url": url,
        "status": record.status,
        "github_number": record.github_number,
        "fix_versions": record.fix_versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{IssueKey, KeyPattern};

    fn record(raw: &str, summary: &str) -> IssueRecord {
        IssueRecord::new(IssueKey::parse(raw, KeyPattern::Strict).unwrap(), summary)
    }

    fn url(record: &IssueRecord) -> String {
        format!("https://example.atlassian.net/browse/{}", record.key)
    }

    #[test]
    fn renders_issue_line_with_unknown_status() {
        let renderer = TemplateRenderer::new(&FileConfig::default()).unwrap();
        let record = record("ABC-123", "Login fails");

        let line = renderer.render_issue_line(&record, &url(&record)).unwrap();

        assert_eq!(
            line,
            "*  **[ABC-123](https://example.atlassian.net/browse/ABC-123)** \
             [Jira Status Unknown] Login fails"
        );
    }

    #[test]
    fn renders_issue_line_with_status_and_github_number() {
        let renderer = TemplateRenderer::new(&FileConfig::default()).unwrap();
        let mut record = record("ABC-123", "Login fails").with_status("In Progress");
        record.github_number = Some(42);

        let line = renderer.render_issue_line(&record, &url(&record)).unwrap();

        assert!(line.contains("[In Progress] Login fails (Fix: #42)"));
    }

    #[test]
    fn renders_release_notes_list() {
        let renderer = TemplateRenderer::new(&FileConfig::default()).unwrap();
        let records = [record("ABC-1", "First"), record("ABC-2", "Second")];

        let list = renderer.render_issue_list(&records, url).unwrap();
        let notes = renderer.render_release_notes(&list).unwrap();

        assert!(notes.starts_with("### Release Notes:\n\n*  **[ABC-1]"));
        assert_eq!(notes.lines().count(), 4);
    }

    #[test]
    fn renders_mirrored_issue() {
        let renderer = TemplateRenderer::new(&FileConfig::default()).unwrap();
        let mut record = record("ABC-123", "Login fails");
        record.description = Some("Steps to reproduce".to_string());

        let title = renderer.render_issue_title(&record, &url(&record)).unwrap();
        let body = renderer.render_issue_body(&record, &url(&record)).unwrap();

        assert_eq!(title, "ABC-123: Login fails");
        assert_eq!(
            body,
            "Steps to reproduce\n\nJira: [ABC-123](https://example.atlassian.net/browse/ABC-123)"
        );
    }

    #[test]
    fn custom_formats_can_use_eq_helper() {
        let config = FileConfig {
            issue_line_format: r#"{{#if (eq status "Done")}}~~{{key}}~~{{else}}{{key}}{{/if}}"#
                .to_string(),
            ..FileConfig::default()
        };
        let renderer = TemplateRenderer::new(&config).unwrap();

        let done = record("ABC-1", "x").with_status("Done");
        let open = record("ABC-2", "y").with_status("Open");

        assert_eq!(renderer.render_issue_line(&done, "").unwrap(), "~~ABC-1~~");
        assert_eq!(renderer.render_issue_line(&open, "").unwrap(), "ABC-2");
    }

    #[test]
    fn does_not_escape_markdown() {
        let renderer = TemplateRenderer::new(&FileConfig::default()).unwrap();
        let record = record("ABC-1", "Use <b>bold</b> & `code`");

        let title = renderer.render_issue_title(&record, "").unwrap();

        assert_eq!(title, "ABC-1: Use <b>bold</b> & `code`");
    }

    #[test]
    fn rejects_invalid_format() {
        let config = FileConfig {
            issue_title_format: "{{#if key}}unclosed".to_string(),
            ..FileConfig::default()
        };

        let result = TemplateRenderer::new(&config);

        assert!(matches!(
            result,
            Err(TemplateError::RegistrationError {
                name: ISSUE_TITLE,
                ..
            })
        ));
    }
}
