//! Page rasterization through pdfium.
//!
//! A fresh binding is created per call so no pdfium state outlives a request.

use anyhow::{anyhow, bail, Result};
use image::RgbaImage;
use pdfium_render::prelude::*;
use tracing::debug;

use super::ocr::PageRasterizer;

#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    /// Directory holding the pdfium shared library. `None` uses the system library.
    library_path: Option<String>,
}

impl PdfiumRenderer {
    pub fn new(library_path: Option<String>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium> {
        let bindings = match &self.library_path {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                dir.as_str(),
            )),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| anyhow!("pdfium library unavailable: {e:?}"))?;
        Ok(Pdfium::new(bindings))
    }

    /// Renders one page (0-based) scaled so that its width is `target_width` pixels.
    /// Returns `None` when the document has no such page.
    pub fn render_page(
        &self,
        pdf: &[u8],
        page_index: usize,
        target_width: u32,
    ) -> Result<Option<RgbaImage>> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| anyhow!("pdfium could not open document: {e:?}"))?;

        let pages = document.pages();
        if page_index >= pages.len() as usize {
            return Ok(None);
        }

        let page = pages
            .get(page_index as u16)
            .map_err(|e| anyhow!("pdfium could not load page {}: {e:?}", page_index + 1))?;
        let page_width = page.width().value;
        if page_width <= 0.0 {
            bail!("page {} has no width", page_index + 1);
        }
        let scale = target_width as f32 / page_width;
        bitmap_to_rgba(&page, scale).map(Some)
    }
}

impl PageRasterizer for PdfiumRenderer {
    fn for_each_page(
        &self,
        pdf: &[u8],
        page_limit: usize,
        zoom: f32,
        visit: &mut dyn FnMut(usize, Result<RgbaImage>),
    ) -> Result<()> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| anyhow!("pdfium could not open document: {e:?}"))?;

        for (index, page) in document.pages().iter().enumerate().take(page_limit) {
            debug!("Rasterizing page {} at zoom {zoom}", index + 1);
            visit(index, bitmap_to_rgba(&page, zoom));
        }
        Ok(())
    }
}

fn bitmap_to_rgba(page: &PdfPage, scale: f32) -> Result<RgbaImage> {
    let config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| anyhow!("pdfium render failed: {e:?}"))?;

    let width = bitmap.width() as u32;
    let height = bitmap.height() as u32;
    RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
        .ok_or_else(|| anyhow!("pdfium returned a {width}x{height} bitmap with a short buffer"))
}
