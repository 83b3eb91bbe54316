//! Multipart form reading shared by the resume and profile-photo uploads.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;

/// The `user_id` and `file` fields of an upload form. Other fields are ignored.
#[derive(Default)]
pub struct UploadForm {
    pub user_id: Option<String>,
    pub file: Option<FilePart>,
}

pub struct FilePart {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("user_id") => {
                    form.user_id = Some(field.text().await.map_err(multipart_error)?);
                }
                Some("file") => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(multipart_error)?;
                    form.file = Some(FilePart {
                        filename,
                        content_type,
                        data,
                    });
                }
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn require_user_id(&self) -> Result<Uuid, AppError> {
        let raw = self
            .user_id
            .as_deref()
            .ok_or_else(|| AppError::Validation("Multipart field 'user_id' is required".to_string()))?;
        Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))
    }

    pub fn require_file(&mut self) -> Result<FilePart, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::Validation("Multipart field 'file' is required".to_string()))
    }
}

impl FilePart {
    pub fn filename_or(&self, fallback: &str) -> String {
        match self.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Body-limit rejections stay 413; every other malformed form is a 400.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}
