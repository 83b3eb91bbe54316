use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::ExtractorConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_photos_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_mb: usize,
    pub extract_timeout_secs: u64,
    pub extractor: ExtractorConfig,
    pub tools: ToolConfig,
}

/// Locations of the native tools the extraction chain shells out to.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub pdfium_library_path: Option<String>,
    pub tesseract_cmd: String,
    pub tesseract_lang: String,
    pub pdftotext_cmd: String,
}

/// Extraction thresholds. Needs none of the service's required variables.
pub fn extractor_from_env() -> Result<ExtractorConfig> {
    let defaults = ExtractorConfig::default();
    Ok(ExtractorConfig {
        min_length: parse_env("EXTRACT_MIN_LENGTH", defaults.min_length)?,
        ocr_page_limit: parse_env("OCR_PAGE_LIMIT", defaults.ocr_page_limit)?,
        ocr_zoom: parse_env("OCR_ZOOM", defaults.ocr_zoom)?,
    })
}

impl ToolConfig {
    pub fn from_env() -> Self {
        Self {
            pdfium_library_path: std::env::var("PDFIUM_LIBRARY_PATH").ok(),
            tesseract_cmd: std::env::var("TESSERACT_CMD").unwrap_or_else(|_| "tesseract".to_string()),
            tesseract_lang: std::env::var("TESSERACT_LANG").unwrap_or_else(|_| "eng".to_string()),
            pdftotext_cmd: std::env::var("PDFTOTEXT_CMD").unwrap_or_else(|_| "pdftotext".to_string()),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_bucket = require_env("S3_BUCKET")?;
        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_photos_bucket: std::env::var("S3_PROFILE_PHOTOS_BUCKET")
                .unwrap_or_else(|_| s3_bucket.clone()),
            s3_bucket,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 2)?,
            extract_timeout_secs: parse_env("EXTRACT_TIMEOUT_SECS", 120)?,
            extractor: extractor_from_env()?,
            tools: ToolConfig::from_env(),
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>()))
}
