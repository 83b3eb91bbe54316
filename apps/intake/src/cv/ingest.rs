use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::records::{self, NewCv, ParsedCv};
use crate::errors::AppError;
use crate::extraction::render::PdfiumRenderer;
use crate::extraction::{Extraction, LayeredExtractor};
use crate::state::AppState;
use crate::storage::{cv_pdf_key, cv_thumbnail_key};
use crate::structuring::ResumeProfile;
use crate::thumbnail::{render_thumbnail, ThumbnailSpec};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A PDF read off a multipart request, already size- and type-checked.
#[derive(Debug)]
pub struct PdfUpload {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub user_id: Uuid,
    pub cv_id: Uuid,
    pub pdf_storage_path: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractStructuredRequest {
    pub user_id: Uuid,
    pub cv_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ExtractStructuredResponse {
    pub user_id: Uuid,
    pub cv_id: Uuid,
    pub extracted_raw: ResumeProfile,
    pub extracted_data: Value,
    pub text_extracted: String,
    pub extraction_stage: Option<&'static str>,
    pub thumbnail_url: Option<String>,
}

/// A declared `application/pdf` type, or PDF magic bytes when the client sent something generic.
pub fn is_pdf(content_type: Option<&str>, head: &[u8]) -> bool {
    let declared = content_type.unwrap_or("").to_ascii_lowercase();
    declared.contains(PDF_CONTENT_TYPE) || head.starts_with(b"%PDF-")
}

/// Rejects uploads that are empty, too large, or not PDFs.
pub fn check_pdf_upload(
    content_type: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("Empty file".to_string()));
    }
    if !is_pdf(content_type, data) {
        return Err(AppError::Validation("Only PDF files are accepted".to_string()));
    }
    if data.len() > max_bytes {
        let mb = data.len() as f64 / (1024.0 * 1024.0);
        return Err(AppError::PayloadTooLarge(format!(
            "File too large: {mb:.2}MB > {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Runs the layered extractor off the async runtime.
/// A panicked task or a timeout yields an empty extraction.
pub async fn extract_off_runtime(
    extractor: Arc<LayeredExtractor>,
    pdf: Bytes,
    timeout: Duration,
) -> Extraction {
    let task = tokio::task::spawn_blocking(move || extractor.extract(&pdf));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(extraction)) => extraction,
        Ok(Err(e)) => {
            warn!("Extraction task failed: {e}");
            Extraction::empty()
        }
        Err(_) => {
            warn!("Extraction timed out after {}s", timeout.as_secs());
            Extraction::empty()
        }
    }
}

/// Stores the PDF and records it. The database row is best-effort.
pub async fn upload_cv(
    state: &AppState,
    user_id: Uuid,
    upload: PdfUpload,
) -> Result<UploadResponse, AppError> {
    let cv_id = Uuid::new_v4();
    let key = cv_pdf_key(user_id, cv_id);

    state.store.put(&key, upload.data, PDF_CONTENT_TYPE).await?;

    let insert = records::insert_uploaded(
        &state.db,
        NewCv {
            cv_id,
            user_id,
            source_filename: &upload.filename,
            pdf_storage_path: &key,
        },
    )
    .await;
    if let Err(e) = insert {
        warn!("Could not record cv {cv_id} for user {user_id}: {e}");
    }

    Ok(UploadResponse {
        user_id,
        cv_id,
        pdf_storage_path: key,
    })
}

/// Download → extract → structure → thumbnail → persist.
pub async fn extract_structured(
    state: &AppState,
    req: &ExtractStructuredRequest,
) -> Result<ExtractStructuredResponse, AppError> {
    let key = stored_pdf_key(state, req.user_id, req.cv_id).await;
    let pdf = state.store.get(&key).await?;

    let extraction = extract_off_runtime(
        state.extractor.clone(),
        pdf.clone(),
        state.config.extract_timeout(),
    )
    .await;
    info!(
        "cv {}: extracted {} chars via {:?} after {} attempt(s)",
        req.cv_id,
        extraction.char_count(),
        extraction.stage,
        extraction.attempts
    );

    let profile = state.structurer.structure(&extraction.text).await?;

    let thumbnail_key = cv_thumbnail_key(req.user_id, req.cv_id);
    let thumbnail_url = match store_thumbnail(state, &thumbnail_key, pdf).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Thumbnail for cv {} skipped: {e}", req.cv_id);
            None
        }
    };

    let parsed = ParsedCv {
        profile: &profile,
        text_extracted: &extraction.text,
        cv_image_path: thumbnail_url.as_ref().map(|_| thumbnail_key.as_str()),
        parse_model: state.structurer.model_name(),
    };
    match records::mark_parsed(&state.db, req.cv_id, parsed).await {
        Ok(0) => warn!("No cvs row for {}; parse result not persisted", req.cv_id),
        Ok(_) => info!("cv {} marked parsed", req.cv_id),
        Err(e) => warn!("Could not persist parse result for cv {}: {e}", req.cv_id),
    }

    Ok(ExtractStructuredResponse {
        user_id: req.user_id,
        cv_id: req.cv_id,
        extracted_data: profile.filtered(),
        extracted_raw: profile,
        text_extracted: extraction.text,
        extraction_stage: extraction.stage,
        thumbnail_url,
    })
}

/// The recorded storage key, or the conventional one when there is no usable row.
async fn stored_pdf_key(state: &AppState, user_id: Uuid, cv_id: Uuid) -> String {
    match records::find_cv(&state.db, user_id, cv_id).await {
        Ok(Some(row)) if !row.pdf_storage_path.is_empty() => row.pdf_storage_path,
        Ok(_) => cv_pdf_key(user_id, cv_id),
        Err(e) => {
            warn!("Lookup of cv {cv_id} failed, using default key: {e}");
            cv_pdf_key(user_id, cv_id)
        }
    }
}

async fn store_thumbnail(state: &AppState, key: &str, pdf: Bytes) -> Result<String, AppError> {
    let jpeg = render_off_runtime(state.renderer.clone(), pdf, ThumbnailSpec::stored_first_page()).await?;
    state.store.put(key, Bytes::from(jpeg), "image/jpeg").await?;
    state.store.presign_get(key).await
}

/// Renders a page preview on the blocking pool.
pub async fn render_off_runtime(
    renderer: PdfiumRenderer,
    pdf: Bytes,
    spec: ThumbnailSpec,
) -> Result<Vec<u8>, AppError> {
    tokio::task::spawn_blocking(move || render_thumbnail(&renderer, &pdf, &spec))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))?
        .map_err(AppError::from)
}
