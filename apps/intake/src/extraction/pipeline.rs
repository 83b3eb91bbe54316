//! Layered Extractor — ordered fallback over interchangeable text strategies.
//!
//! Every strategy sees the raw document. The first result that passes the
//! sufficiency gate wins; otherwise the last attempted result is returned.
//! Nothing here ever returns an error: a failing (or panicking) strategy counts
//! as an empty result and the fold moves on to the next one.

use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

/// Tunables for a single extraction run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorConfig {
    /// Trimmed character count below which a result is insufficient.
    pub min_length: usize,
    /// Maximum number of pages rasterized for OCR.
    pub ocr_page_limit: usize,
    /// Render scale factor used when rasterizing for OCR.
    pub ocr_zoom: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_length: 50,
            ocr_page_limit: 3,
            ocr_zoom: 2.0,
        }
    }
}

/// One technique for turning PDF bytes into plain text.
///
/// Implementations may fail for any reason; the pipeline absorbs the error.
pub trait ExtractionStrategy: Send + Sync {
    /// Short stable label used in logs and extraction reports.
    fn name(&self) -> &'static str;

    fn extract(&self, pdf: &[u8], config: &ExtractorConfig) -> Result<String>;
}

/// Outcome of a pipeline run, including which stage produced the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    /// Stage whose output was returned. `None` when no stage ran.
    pub stage: Option<&'static str>,
    pub sufficient: bool,
    pub attempts: usize,
}

impl Extraction {
    /// Outcome when nothing could be run at all.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            stage: None,
            sufficient: false,
            attempts: 0,
        }
    }

    /// Length in characters, the unit `min_length` is measured in.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Insufficient iff empty or the trimmed char count is below `min_length`.
pub fn is_sufficient(text: &str, min_length: usize) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= min_length
}

pub struct LayeredExtractor {
    config: ExtractorConfig,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl LayeredExtractor {
    pub fn new(config: ExtractorConfig, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { config, strategies }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Best-effort plain text for a PDF held in memory. Returns `""` on total failure.
    pub fn extract_text(&self, pdf: &[u8]) -> String {
        self.extract(pdf).text
    }

    /// Reads the document from disk first. An unreadable file yields `""`.
    pub fn extract_text_from_path(&self, path: &Path) -> String {
        match std::fs::read(path) {
            Ok(bytes) => self.extract_text(&bytes),
            Err(e) => {
                warn!("Could not read PDF at {}: {e}", path.display());
                String::new()
            }
        }
    }

    /// Runs the fold and reports which stage won.
    pub fn extract(&self, pdf: &[u8]) -> Extraction {
        let min_length = self.config.min_length;
        let mut attempts = 0usize;

        let outcome = self.strategies.iter().try_fold(
            (String::new(), None),
            |_, strategy| {
                attempts += 1;
                let text = self.attempt(strategy.as_ref(), pdf);
                let last = (text, Some(strategy.name()));
                if is_sufficient(&last.0, min_length) {
                    ControlFlow::Break(last)
                } else {
                    ControlFlow::Continue(last)
                }
            },
        );

        let (sufficient, (text, stage)) = match outcome {
            ControlFlow::Break(last) => (true, last),
            ControlFlow::Continue(last) => (false, last),
        };

        let text = text.trim().to_string();
        if sufficient {
            info!(
                "Extracted {} chars via '{}' after {attempts} attempt(s)",
                text.chars().count(),
                stage.unwrap_or("none")
            );
        } else {
            warn!(
                "No extraction stage met min_length={min_length}; returning {} chars from '{}'",
                text.chars().count(),
                stage.unwrap_or("none")
            );
        }

        Extraction {
            text,
            stage,
            sufficient,
            attempts,
        }
    }

    /// One guarded stage: errors and panics both become an empty string.
    fn attempt(&self, strategy: &dyn ExtractionStrategy, pdf: &[u8]) -> String {
        let name = strategy.name();
        debug!("Trying extraction stage '{name}'");

        match catch_unwind(AssertUnwindSafe(|| strategy.extract(pdf, &self.config))) {
            Ok(Ok(text)) => {
                let text = text.trim().to_string();
                debug!("Stage '{name}' produced {} chars", text.chars().count());
                text
            }
            Ok(Err(e)) => {
                debug!("Stage '{name}' failed: {e:#}");
                String::new()
            }
            Err(_) => {
                warn!("Stage '{name}' panicked; treating as empty");
                String::new()
            }
        }
    }
}
