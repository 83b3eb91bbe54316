use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an uploaded resume.
pub const STATUS_UPLOADED: &str = "uploaded";
pub const STATUS_PARSED: &str = "parsed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvRow {
    pub cv_id: Uuid,
    pub user_id: Uuid,
    pub source_filename: String,
    pub pdf_storage_path: String,
    pub cv_image_path: Option<String>,
    pub text_extracted: Option<String>,
    pub raw_extracted: Value,
    pub filtered_extracted: Value,
    pub skills: Value,
    pub education: Value,
    pub experiences: Value,
    pub status: String,
    pub parse_model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
