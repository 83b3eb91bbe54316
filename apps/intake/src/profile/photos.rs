use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::storage::{profile_photo_key, ObjectStore};

pub const PHOTO_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub status: &'static str,
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub presigned_url: String,
}

/// Only JPEG and PNG are stored; the declared content type decides.
pub fn check_photo_upload(
    content_type: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<String, AppError> {
    let declared = content_type.unwrap_or("").trim().to_ascii_lowercase();
    if !PHOTO_CONTENT_TYPES.contains(&declared.as_str()) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Unsupported image type: {}",
            content_type.unwrap_or("none")
        )));
    }
    if data.is_empty() {
        return Err(AppError::Validation("Empty file".to_string()));
    }
    if data.len() > max_bytes {
        let mb = data.len() as f64 / (1024.0 * 1024.0);
        return Err(AppError::PayloadTooLarge(format!(
            "File too large: {mb:.2}MB > {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(declared)
}

pub async fn upload_photo(
    photos: &ObjectStore,
    user_id: Uuid,
    filename: &str,
    content_type: String,
    data: Bytes,
) -> Result<PhotoUploadResponse, AppError> {
    let key = profile_photo_key(user_id, Utc::now().timestamp(), filename);
    let size = data.len();
    photos.put(&key, data, &content_type).await?;
    let presigned_url = photos.presign_get(&key).await?;
    info!("Profile photo for user {user_id} stored ({size} bytes)");

    Ok(PhotoUploadResponse {
        status: "uploaded",
        bucket: photos.bucket().to_string(),
        key,
        content_type,
        presigned_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 2 * 1024 * 1024;

    #[test]
    fn test_jpeg_and_png_accepted() {
        assert_eq!(check_photo_upload(Some("image/jpeg"), b"\xff\xd8", MAX).unwrap(), "image/jpeg");
        assert_eq!(check_photo_upload(Some("IMAGE/PNG"), b"\x89PNG", MAX).unwrap(), "image/png");
    }

    #[test]
    fn test_other_types_are_unsupported_media() {
        for ct in [Some("image/gif"), Some("application/pdf"), None] {
            match check_photo_upload(ct, b"GIF89a", MAX) {
                Err(AppError::UnsupportedMediaType(msg)) => {
                    assert!(msg.starts_with("Unsupported image type: "))
                }
                other => panic!("unexpected result for {ct:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_and_oversized_photos() {
        assert!(matches!(
            check_photo_upload(Some("image/png"), b"", MAX),
            Err(AppError::Validation(_))
        ));
        let big = vec![0u8; MAX + MAX / 4];
        match check_photo_upload(Some("image/png"), &big, MAX) {
            Err(AppError::PayloadTooLarge(msg)) => assert_eq!(msg, "File too large: 2.50MB > 2MB"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
