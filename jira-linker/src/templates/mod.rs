//! Template rendering using Handlebars.
//!
//! Issue list lines, release notes and mirrored GitHub issue titles and
//! bodies are all rendered from configurable Handlebars formats.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};
