//! Page previews: render one PDF page and encode it at a fixed size.

use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::errors::AppError;
use crate::extraction::ocr::flatten_onto_white;
use crate::extraction::render::PdfiumRenderer;

/// JPEG quality for on-demand conversions.
pub const CONVERT_JPEG_QUALITY: u8 = 95;
/// JPEG quality for stored thumbnails.
pub const STORED_JPEG_QUALITY: u8 = 85;
const MAX_DIMENSION: u32 = 4000;
/// Render at twice the target width, then downsample.
const OVERSAMPLE: u32 = 2;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Format must be PNG, JPEG, or WEBP")]
    UnsupportedFormat,

    #[error("Page must be >= 1")]
    InvalidPage,

    #[error("Width and height must be between 1 and 4000")]
    InvalidSize,

    #[error("Page {0} does not exist in this document")]
    PageOutOfRange(u32),

    #[error("PDF conversion failed: {0}")]
    Render(#[from] anyhow::Error),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl From<ThumbnailError> for AppError {
    fn from(e: ThumbnailError) -> Self {
        match e {
            ThumbnailError::Render(inner) => AppError::Internal(inner.context("PDF conversion failed")),
            ThumbnailError::Encode(inner) => {
                AppError::Internal(anyhow::Error::new(inner).context("image encoding failed"))
            }
            other => AppError::Validation(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(OutputFormat::Png),
            "JPEG" => Ok(OutputFormat::Jpeg),
            "WEBP" => Ok(OutputFormat::Webp),
            _ => Err(ThumbnailError::UnsupportedFormat),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThumbnailSpec {
    /// 1-based page number.
    pub page: u32,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub jpeg_quality: u8,
}

impl ThumbnailSpec {
    /// First page as a stored JPEG thumbnail.
    pub fn stored_first_page() -> Self {
        Self {
            page: 1,
            width: 600,
            height: 800,
            format: OutputFormat::Jpeg,
            jpeg_quality: STORED_JPEG_QUALITY,
        }
    }

    pub fn validate(&self) -> Result<(), ThumbnailError> {
        if self.page == 0 {
            return Err(ThumbnailError::InvalidPage);
        }
        let in_range = |v: u32| (1..=MAX_DIMENSION).contains(&v);
        if !in_range(self.width) || !in_range(self.height) {
            return Err(ThumbnailError::InvalidSize);
        }
        Ok(())
    }
}

/// Renders `spec.page` and encodes it. Blocking.
pub fn render_thumbnail(
    renderer: &PdfiumRenderer,
    pdf: &[u8],
    spec: &ThumbnailSpec,
) -> Result<Vec<u8>, ThumbnailError> {
    spec.validate()?;
    let raster = renderer
        .render_page(pdf, (spec.page - 1) as usize, spec.width * OVERSAMPLE)?
        .ok_or(ThumbnailError::PageOutOfRange(spec.page))?;
    encode(&raster, spec)
}

/// Resizes to exactly `width × height` and encodes. JPEG output is flattened onto white.
pub fn encode(raster: &RgbaImage, spec: &ThumbnailSpec) -> Result<Vec<u8>, ThumbnailError> {
    let resized = imageops::resize(raster, spec.width, spec.height, FilterType::Lanczos3);
    let mut buf = Vec::new();

    match spec.format {
        OutputFormat::Jpeg => {
            let opaque = flatten_onto_white(&resized);
            JpegEncoder::new_with_quality(&mut buf, spec.jpeg_quality).encode_image(&opaque)?;
        }
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(resized).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        }
        OutputFormat::Webp => {
            DynamicImage::ImageRgba8(resized)
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::WebP)?;
        }
    }
    Ok(buf)
}
