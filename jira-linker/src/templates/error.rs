//! Template rendering error types.

/// Template rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Handlebars rendering error.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// A configured format is not a valid template.
    #[error("Invalid {name} format: {source}")]
    RegistrationError {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}
