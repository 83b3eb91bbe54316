use std::fs;
use std::process::Command;

use anyhow::{bail, Context, Result};

use super::pipeline::{ExtractionStrategy, ExtractorConfig};

/// Layout-preserving stage backed by poppler's `pdftotext -layout`.
///
/// Keeps column and table alignment, which rescues two-column and tabular
/// resumes that the stream-order parsers scramble. A missing binary is just
/// another failure for the pipeline to absorb.
pub struct PdftotextLayout {
    command: String,
}

impl PdftotextLayout {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for PdftotextLayout {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl ExtractionStrategy for PdftotextLayout {
    fn name(&self) -> &'static str {
        "pdftotext-layout"
    }

    fn extract(&self, pdf: &[u8], _config: &ExtractorConfig) -> Result<String> {
        let dir = tempfile::tempdir().context("failed creating temporary directory")?;
        let input_path = dir.path().join("input.pdf");
        fs::write(&input_path, pdf).context("failed writing temporary pdf file")?;

        let output = Command::new(&self.command)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(&input_path)
            .arg("-")
            .output()
            .with_context(|| format!("'{}' is unavailable", self.command))?;

        if !output.status.success() {
            bail!(
                "{} exited with {:?}: {}",
                self.command,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(normalize_layout_text(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Form feeds become newlines and trailing padding is dropped per line.
fn normalize_layout_text(raw: &str) -> String {
    raw.split('\u{000C}')
        .map(|page| {
            page.lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
