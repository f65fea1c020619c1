//! GitHub Actions step outputs.
//!
//! Outputs are appended to the file named by `GITHUB_OUTPUT` using the
//! heredoc-style delimiter syntax, so multi-line values survive. Outside of
//! Actions they are printed to stdout as `name=value` lines.

mod error;

pub use error::OutputError;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";
const DELIMITER: &str = "JIRA_LINKER_EOF";

/// Where outputs were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

/// Ordered set of named step outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutputs {
    entries: Vec<(String, String)>,
}

impl ActionOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an output, replacing any earlier value with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::InvalidName`] for empty or multi-line names.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), OutputError> {
        let name = name.into();
        if name.trim().is_empty() || name.contains(['\n', '\r', '=']) {
            return Err(OutputError::InvalidName(name));
        }

        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the outputs in `GITHUB_OUTPUT` file syntax.
    #[must_use]
    pub fn to_file_format(&self) -> String {
        let mut rendered = String::new();
        for (name, value) in &self.entries {
            let delimiter = delimiter_for(value);
            rendered.push_str(&format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"));
        }
        rendered
    }

    /// Renders the outputs as `name=value` lines.
    #[must_use]
    pub fn to_plain_format(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}={value}\n"))
            .collect()
    }

    /// Appends the outputs to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::IoError`] if the file cannot be written.
    pub fn write_to_file(&self, path: &Path) -> Result<(), OutputError> {
        let io_error = |source| OutputError::IoError {
            target: path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_error)?;
        file.write_all(self.to_file_format().as_bytes())
            .map_err(io_error)?;

        debug!(path = %path.display(), count = self.len(), "Wrote step outputs");
        Ok(())
    }

    /// Writes the outputs to `GITHUB_OUTPUT` if set, otherwise to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::IoError`] if writing fails.
    pub fn emit(&self) -> Result<OutputTarget, OutputError> {
        if let Some(path) = std::env::var_os(OUTPUT_FILE_ENV).filter(|p| !p.is_empty()) {
            let path = PathBuf::from(path);
            self.write_to_file(&path)?;
            return Ok(OutputTarget::File(path));
        }

        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(self.to_plain_format().as_bytes())
            .map_err(|source| OutputError::IoError {
                target: "stdout".to_string(),
                source,
            })?;
        Ok(OutputTarget::Stdout)
    }
}

/// A delimiter line that does not occur in `value`.
fn delimiter_for(value: &str) -> String {
    let mut delimiter = DELIMITER.to_string();
    let mut suffix = 0u32;
    while value.lines().any(|line| line == delimiter) {
        suffix += 1;
        delimiter = format!("{DELIMITER}_{suffix}");
    }
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn later_values_replace_earlier_ones() {
        let mut outputs = ActionOutputs::new();
        outputs.set("issues", "ABC-1").unwrap();
        outputs.set("notes", "").unwrap();
        outputs.set("issues", "ABC-1,ABC-2").unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs.get("issues"), Some("ABC-1,ABC-2"));
        assert_eq!(outputs.iter().next(), Some(("issues", "ABC-1,ABC-2")));
    }

    #[test]
    fn rejects_invalid_names() {
        let mut outputs = ActionOutputs::new();
        assert!(matches!(
            outputs.set("a=b", "x"),
            Err(OutputError::InvalidName(_))
        ));
        assert!(matches!(outputs.set(" ", "x"), Err(OutputError::InvalidName(_))));
    }

    #[test]
    fn file_format_keeps_multiline_values() {
        let mut outputs = ActionOutputs::new();
        outputs.set("notes", "line one\nline two").unwrap();

        assert_eq!(
            outputs.to_file_format(),
            "notes<<JIRA_LINKER_EOF\nline one\nline two\nJIRA_LINKER_EOF\n"
        );
    }

    #[test]
    fn delimiter_avoids_collisions() {
        assert_eq!(delimiter_for("plain"), DELIMITER);
        assert_eq!(
            delimiter_for("before\nJIRA_LINKER_EOF\nafter"),
            "JIRA_LINKER_EOF_1"
        );
    }

    #[test]
    fn emit_appends_to_output_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output");
        std::fs::write(&path, "existing<<EOF\nvalue\nEOF\n").unwrap();

        let mut outputs = ActionOutputs::new();
        outputs.set("issues", "ABC-1").unwrap();

        temp_env::with_var(OUTPUT_FILE_ENV, path.to_str(), || {
            let target = outputs.emit().unwrap();
            assert_eq!(target, OutputTarget::File(path.clone()));
        });

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "existing<<EOF\nvalue\nEOF\nissues<<JIRA_LINKER_EOF\nABC-1\nJIRA_LINKER_EOF\n"
        );
    }

    #[test]
    fn plain_format_for_stdout() {
        let mut outputs = ActionOutputs::new();
        outputs.set("issues", "ABC-1,ABC-2").unwrap();
        outputs.set("title", "Fix Login").unwrap();

        assert_eq!(
            outputs.to_plain_format(),
            "issues=ABC-1,ABC-2\ntitle=Fix Login\n"
        );
    }
}
