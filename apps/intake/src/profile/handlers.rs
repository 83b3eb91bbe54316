use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::forms::UploadForm;
use crate::profile::photos::{check_photo_upload, upload_photo, PhotoUploadResponse};
use crate::state::AppState;

/// POST /profile/photo/upload_s3
pub async fn handle_photo_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let user_id = form.require_user_id()?;
    let file = form.require_file()?;
    let content_type = check_photo_upload(
        file.content_type.as_deref(),
        &file.data,
        state.config.max_upload_bytes(),
    )?;

    let filename = file.filename_or("avatar");
    let response = upload_photo(&state.photos, user_id, &filename, content_type, file.data).await?;
    Ok(Json(response))
}
