// Resume text extraction: ordered fallback from text layers to OCR.
// Everything here is blocking; async callers must go through spawn_blocking.

pub mod layout;
pub mod ocr;
pub mod pipeline;
pub mod render;
pub mod text_layer;

pub use pipeline::{Extraction, ExtractionStrategy, ExtractorConfig, LayeredExtractor};

use crate::config::ToolConfig;
use layout::PdftotextLayout;
use ocr::{OcrText, TesseractCli};
use render::PdfiumRenderer;
use text_layer::{LopdfText, PdfExtractText};

/// The production chain: pdf-extract → lopdf → pdftotext -layout → pdfium + tesseract.
pub fn standard_extractor(config: ExtractorConfig, tools: &ToolConfig) -> LayeredExtractor {
    LayeredExtractor::new(
        config,
        vec![
            Box::new(PdfExtractText),
            Box::new(LopdfText),
            Box::new(PdftotextLayout::new(tools.pdftotext_cmd.clone())),
            Box::new(OcrText::new(
                Box::new(PdfiumRenderer::new(tools.pdfium_library_path.clone())),
                Box::new(TesseractCli::new(
                    tools.tesseract_cmd.clone(),
                    tools.tesseract_lang.clone(),
                )),
            )),
        ],
    )
}

/// Born-digital PDFs built in memory for tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    pub const RESUME_LINES: [&str; 5] = [
        "Jane Doe",
        "Senior Rust Engineer",
        "Berlin, Germany",
        "jane@example.com",
        "Built PDF ingestion pipelines and storage engines for ten years.",
    ];

    /// One US-letter page, Courier 12pt, one `Tj` per line.
    pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}
