use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::cv::{CvRow, STATUS_PARSED, STATUS_UPLOADED};
use crate::structuring::ResumeProfile;

pub struct NewCv<'a> {
    pub cv_id: Uuid,
    pub user_id: Uuid,
    pub source_filename: &'a str,
    pub pdf_storage_path: &'a str,
}

/// Everything the structuring pass writes back onto a record.
pub struct ParsedCv<'a> {
    pub profile: &'a ResumeProfile,
    pub text_extracted: &'a str,
    pub cv_image_path: Option<&'a str>,
    pub parse_model: &'a str,
}

pub async fn insert_uploaded(pool: &PgPool, cv: NewCv<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO cvs
            (cv_id, user_id, source_filename, pdf_storage_path,
             raw_extracted, filtered_extracted, skills, education, experiences, status)
        VALUES ($1, $2, $3, $4, '{}'::jsonb, '{}'::jsonb, '[]'::jsonb, '[]'::jsonb, '[]'::jsonb, $5)
        "#,
    )
    .bind(cv.cv_id)
    .bind(cv.user_id)
    .bind(cv.source_filename)
    .bind(cv.pdf_storage_path)
    .bind(STATUS_UPLOADED)
    .execute(pool)
    .await?;

    info!("Inserted cv {} for user {}", cv.cv_id, cv.user_id);
    Ok(())
}

pub async fn find_cv(
    pool: &PgPool,
    user_id: Uuid,
    cv_id: Uuid,
) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM cvs WHERE cv_id = $1 AND user_id = $2")
        .bind(cv_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Returns the number of rows updated (0 when the record does not exist).
pub async fn mark_parsed(pool: &PgPool, cv_id: Uuid, parsed: ParsedCv<'_>) -> Result<u64, sqlx::Error> {
    let profile = parsed.profile;
    let raw = serde_json::to_value(profile).unwrap_or(Value::Null);

    let result = sqlx::query(
        r#"
        UPDATE cvs SET
            raw_extracted = $1,
            filtered_extracted = $2,
            skills = $3,
            education = $4,
            experiences = $5,
            text_extracted = $6,
            cv_image_path = COALESCE($7, cv_image_path),
            status = $8,
            parse_model = $9,
            updated_at = NOW()
        WHERE cv_id = $10
        "#,
    )
    .bind(&raw)
    .bind(profile.filtered())
    .bind(serde_json::to_value(&profile.skills).unwrap_or_default())
    .bind(serde_json::to_value(&profile.education).unwrap_or_default())
    .bind(serde_json::to_value(&profile.experience).unwrap_or_default())
    .bind(parsed.text_extracted)
    .bind(parsed.cv_image_path)
    .bind(STATUS_PARSED)
    .bind(parsed.parse_model)
    .bind(cv_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
