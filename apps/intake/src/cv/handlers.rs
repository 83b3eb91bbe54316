use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::ingest::{
    check_pdf_upload, extract_off_runtime, extract_structured, render_off_runtime, upload_cv,
    ExtractStructuredRequest, ExtractStructuredResponse, PdfUpload, UploadResponse,
};
use crate::errors::AppError;
use crate::forms::{FilePart, UploadForm};
use crate::state::AppState;
use crate::structuring::ResumeProfile;
use crate::thumbnail::{OutputFormat, ThumbnailSpec, CONVERT_JPEG_QUALITY};

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_page() -> u32 {
    1
}

fn default_width() -> u32 {
    300
}

fn default_height() -> u32 {
    400
}

fn default_format() -> String {
    "PNG".to_string()
}

impl FilePart {
    fn into_pdf(self, max_bytes: usize) -> Result<PdfUpload, AppError> {
        check_pdf_upload(self.content_type.as_deref(), &self.data, max_bytes)?;
        Ok(PdfUpload {
            filename: self.filename_or("cv.pdf"),
            data: self.data,
        })
    }
}

/// POST /cv/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let user_id = form.require_user_id()?;
    let upload = form.require_file()?.into_pdf(state.config.max_upload_bytes())?;

    info!("Upload from user {user_id}: {} ({} bytes)", upload.filename, upload.data.len());
    Ok(Json(upload_cv(&state, user_id, upload).await?))
}

/// POST /cv/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file()?.into_pdf(state.config.max_upload_bytes())?;

    let extraction = extract_off_runtime(
        state.extractor.clone(),
        upload.data,
        state.config.extract_timeout(),
    )
    .await;
    info!(
        "Extracted {} chars from {} via {:?}",
        extraction.char_count(),
        upload.filename,
        extraction.stage
    );

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        extraction.text,
    ))
}

/// POST /cv/parse
/// Structuring failures other than a rejected API key degrade to the empty profile.
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ResumeProfile>, AppError> {
    if let Some(user_id) = req.user_id {
        info!("Parse request for user {user_id}: {} chars", req.text.chars().count());
    }
    match state.structurer.structure(&req.text).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e @ AppError::Unauthorized(_)) => Err(e),
        Err(e) => {
            warn!("Structuring failed, returning empty profile: {e}");
            Ok(Json(ResumeProfile::default()))
        }
    }
}

/// POST /cv/extract-structured
pub async fn handle_extract_structured(
    State(state): State<AppState>,
    Json(req): Json<ExtractStructuredRequest>,
) -> Result<Json<ExtractStructuredResponse>, AppError> {
    Ok(Json(extract_structured(&state, &req).await?))
}

/// POST /cv/convert-to-image
pub async fn handle_convert_to_image(
    State(state): State<AppState>,
    Query(params): Query<ConvertQuery>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let format: OutputFormat = params.format.parse()?;
    let spec = ThumbnailSpec {
        page: params.page,
        width: params.width,
        height: params.height,
        format,
        jpeg_quality: CONVERT_JPEG_QUALITY,
    };
    spec.validate()?;

    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file()?.into_pdf(state.config.max_upload_bytes())?;

    let image = render_off_runtime(state.renderer.clone(), upload.data, spec).await?;
    let disposition = format!(
        "inline; filename=cv_page_{}.{}",
        spec.page,
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image,
    ))
}
