//! OCR stage: rasterize the first pages, flatten onto white, recognize.

use std::process::Command;

use anyhow::{bail, Context, Result};
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use tracing::debug;

use super::pipeline::{ExtractionStrategy, ExtractorConfig};

/// Produces page rasters in page order.
///
/// Each raster is handed to `visit` and dropped before the next page is
/// rendered, so peak memory stays at one page. A per-page failure is passed
/// through as `Err`; a document-level failure is returned.
pub trait PageRasterizer: Send + Sync {
    fn for_each_page(
        &self,
        pdf: &[u8],
        page_limit: usize,
        zoom: f32,
        visit: &mut dyn FnMut(usize, Result<RgbaImage>),
    ) -> Result<()>;
}

/// Turns an opaque page image into text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &RgbImage) -> Result<String>;
}

/// Tesseract via its command-line front end.
pub struct TesseractCli {
    command: String,
    language: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &RgbImage) -> Result<String> {
        let dir = tempfile::tempdir().context("failed creating temporary directory")?;
        let page_path = dir.path().join("page.png");
        image
            .save_with_format(&page_path, ImageFormat::Png)
            .context("failed writing page raster")?;

        let output = Command::new(&self.command)
            .arg(&page_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
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
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Composites an RGBA raster over a white background.
pub fn flatten_onto_white(raster: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
        let [r, g, b, a] = raster.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

pub struct OcrText {
    rasterizer: Box<dyn PageRasterizer>,
    engine: Box<dyn OcrEngine>,
}

impl OcrText {
    pub fn new(rasterizer: Box<dyn PageRasterizer>, engine: Box<dyn OcrEngine>) -> Self {
        Self { rasterizer, engine }
    }
}

impl ExtractionStrategy for OcrText {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn extract(&self, pdf: &[u8], config: &ExtractorConfig) -> Result<String> {
        let mut parts: Vec<String> = Vec::new();
        let engine = self.engine.as_ref();

        self.rasterizer.for_each_page(
            pdf,
            config.ocr_page_limit,
            config.ocr_zoom,
            &mut |index, raster| {
                let recognized = raster.and_then(|raster| {
                    let opaque = flatten_onto_white(&raster);
                    drop(raster);
                    engine.recognize(&opaque)
                });
                match recognized {
                    Ok(text) => parts.push(text),
                    Err(e) => debug!("OCR skipped page {}: {e:#}", index + 1),
                }
            },
        )?;

        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fake document of `pages` pages. Listed pages fail to render.
    struct FakeScan {
        pages: usize,
        broken: Vec<usize>,
        rendered: Arc<AtomicUsize>,
    }

    impl PageRasterizer for FakeScan {
        fn for_each_page(
            &self,
            _pdf: &[u8],
            page_limit: usize,
            _zoom: f32,
            visit: &mut dyn FnMut(usize, Result<RgbaImage>),
        ) -> Result<()> {
            for index in (0..self.pages).take(page_limit) {
                self.rendered.fetch_add(1, Ordering::SeqCst);
                if self.broken.contains(&index) {
                    visit(index, Err(anyhow::anyhow!("corrupt page stream")));
                } else {
                    // Encode the page number in the red channel of a transparent raster.
                    let raster = RgbaImage::from_pixel(2, 2, image::Rgba([index as u8, 0, 0, 0]));
                    visit(index, Ok(raster));
                }
            }
            Ok(())
        }
    }

    struct Unopenable;

    impl PageRasterizer for Unopenable {
        fn for_each_page(
            &self,
            _pdf: &[u8],
            _page_limit: usize,
            _zoom: f32,
            _visit: &mut dyn FnMut(usize, Result<RgbaImage>),
        ) -> Result<()> {
            bail!("password required")
        }
    }

    /// Reports which page it saw and records the pixels it was given.
    struct EchoEngine {
        seen: Arc<Mutex<Vec<[u8; 3]>>>,
    }

    impl OcrEngine for EchoEngine {
        fn recognize(&self, image: &RgbImage) -> Result<String> {
            let pixel = image.get_pixel(0, 0).0;
            self.seen.lock().unwrap().push(pixel);
            Ok(format!("page text {}", pixel[0]))
        }
    }

    fn strategy(scan: FakeScan) -> (OcrText, Arc<Mutex<Vec<[u8; 3]>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let engine = EchoEngine { seen: seen.clone() };
        (OcrText::new(Box::new(scan), Box::new(engine)), seen)
    }

    #[test]
    fn test_two_page_scan_joins_pages_with_newline() {
        let rendered = Arc::new(AtomicUsize::new(0));
        let (ocr, _) = strategy(FakeScan {
            pages: 2,
            broken: vec![],
            rendered: rendered.clone(),
        });

        let text = ocr.extract(b"%PDF", &ExtractorConfig::default()).unwrap();
        // Transparent pixels flatten to white, so the red channel reads 255.
        assert_eq!(text, "page text 255\npage text 255");
        assert_eq!(rendered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_page_limit_caps_rasterization() {
        let rendered = Arc::new(AtomicUsize::new(0));
        let (ocr, seen) = strategy(FakeScan {
            pages: 5,
            broken: vec![],
            rendered: rendered.clone(),
        });
        let config = ExtractorConfig {
            ocr_page_limit: 3,
            ..ExtractorConfig::default()
        };

        let text = ocr.extract(b"%PDF", &config).unwrap();
        assert_eq!(rendered.load(Ordering::SeqCst), 3);
        assert_eq!(seen.lock().unwrap().len(), 3);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_broken_page_is_skipped() {
        let rendered = Arc::new(AtomicUsize::new(0));
        let (ocr, seen) = strategy(FakeScan {
            pages: 3,
            broken: vec![1],
            rendered: rendered.clone(),
        });

        let text = ocr.extract(b"%PDF", &ExtractorConfig::default()).unwrap();
        assert_eq!(rendered.load(Ordering::SeqCst), 3);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_unopenable_document_is_an_error() {
        let ocr = OcrText::new(
            Box::new(Unopenable),
            Box::new(EchoEngine {
                seen: Arc::new(Mutex::new(Vec::new())),
            }),
        );
        assert!(ocr.extract(b"%PDF", &ExtractorConfig::default()).is_err());
    }

    #[test]
    fn test_flatten_onto_white() {
        let mut raster = RgbaImage::new(3, 1);
        raster.put_pixel(0, 0, image::Rgba([10, 20, 30, 255]));
        raster.put_pixel(1, 0, image::Rgba([10, 20, 30, 0]));
        raster.put_pixel(2, 0, image::Rgba([0, 0, 0, 128]));

        let flat = flatten_onto_white(&raster);
        assert_eq!(flat.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(2, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_missing_tesseract_is_an_error() {
        let engine = TesseractCli::new("definitely-not-tesseract", "eng");
        let image = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        assert!(engine.recognize(&image).is_err());
    }
}
