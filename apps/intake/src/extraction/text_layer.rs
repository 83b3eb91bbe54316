//! Text-layer strategies: read the embedded text of born-digital PDFs.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use super::pipeline::{ExtractionStrategy, ExtractorConfig};

/// Primary stage. `pdf-extract` walks content streams and honours font
/// encodings, which gives the best fidelity on born-digital resumes.
pub struct PdfExtractText;

impl ExtractionStrategy for PdfExtractText {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, pdf: &[u8], _config: &ExtractorConfig) -> Result<String> {
        pdf_extract::extract_text_from_mem(pdf).context("pdf-extract could not read document")
    }
}

/// Alternate stage built on `lopdf`'s object model. Tolerates broken pages:
/// a page that fails to decode is skipped rather than failing the document.
pub struct LopdfText;

impl ExtractionStrategy for LopdfText {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, pdf: &[u8], _config: &ExtractorConfig) -> Result<String> {
        let doc = Document::load_mem(pdf).context("lopdf could not load document")?;
        if doc.is_encrypted() {
            bail!("document is encrypted");
        }

        let pages = doc.get_pages();
        let mut parts = Vec::with_capacity(pages.len());
        for (page_num, page_id) in &pages {
            match page_text(&doc, *page_id) {
                Ok(text) => parts.push(text),
                Err(e) => debug!("lopdf skipped page {page_num}: {e}"),
            }
        }

        if parts.is_empty() && !pages.is_empty() {
            bail!("no page of {} could be decoded", pages.len());
        }
        Ok(parts.join("\n"))
    }
}

/// Walks one page's content stream. Text-positioning operators that move to a
/// new line become line breaks so adjacent lines are not glued together.
fn page_text(doc: &Document, page_id: ObjectId) -> Result<String> {
    let encodings: BTreeMap<Vec<u8>, &str> = doc
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut text = String::new();
    let mut encoding = None;
    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
            }
            "Tj" | "TJ" => collect_shown(&mut text, encoding, operands),
            "'" | "\"" => {
                line_break(&mut text);
                collect_shown(&mut text, encoding, operands);
            }
            "Td" | "TD" => {
                let dy = operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0);
                if dy == 0.0 {
                    word_break(&mut text);
                } else {
                    line_break(&mut text);
                }
            }
            "T*" | "Tm" | "ET" => line_break(&mut text),
            _ => {}
        }
    }
    Ok(text)
}

fn collect_shown(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)),
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => {
                            text.push_str(&Document::decode_text(encoding, bytes))
                        }
                        // Large negative kerning is a visual word gap.
                        Object::Integer(i) if *i < -100 => word_break(text),
                        Object::Real(r) if *r < -100.0 => word_break(text),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn line_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn word_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
}
