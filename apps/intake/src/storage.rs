use std::time::Duration;

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

/// Lifetime of presigned GET URLs handed back to clients.
pub const PRESIGN_TTL: Duration = Duration::from_secs(3600);

/// Constructs an S3 client for an S3-compatible endpoint with static credentials.
pub async fn build_s3_client(config: &Config) -> S3Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "intake-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    S3Client::from_conf(s3_config)
}

pub fn cv_pdf_key(user_id: Uuid, cv_id: Uuid) -> String {
    format!("{user_id}/{cv_id}/cv.pdf")
}

pub fn cv_thumbnail_key(user_id: Uuid, cv_id: Uuid) -> String {
    format!("{user_id}/{cv_id}/thumb.jpg")
}

/// `{user_id}/{unix_seconds}-{filename}`, with path separators in the filename flattened.
pub fn profile_photo_key(user_id: Uuid, unix_seconds: i64, filename: &str) -> String {
    let name: String = filename
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("{user_id}/{unix_seconds}-{name}")
}

/// Thin wrapper over the bucket the service owns.
#[derive(Clone)]
pub struct ObjectStore {
    client: S3Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Same connection, different bucket.
    pub fn with_bucket(&self, bucket: String) -> Self {
        Self {
            client: self.client.clone(),
            bucket,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Names of every bucket visible to the configured credentials.
    pub async fn list_buckets(&self) -> Result<Vec<String>, AppError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| AppError::S3(format!("list buckets: {}", e.into_service_error())))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    pub async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("put {key}: {e}")))?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Fetches an object. A missing key is `NotFound`, not a storage failure.
    pub async fn get(&self, key: &str) -> Result<Bytes, AppError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::NotFound("Stored PDF not found".to_string())
                } else {
                    AppError::S3(format!("get {key}: {service_error}"))
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::S3(format!("read {key}: {e}")))?;
        Ok(data.into_bytes())
    }

    pub async fn presign_get(&self, key: &str) -> Result<String, AppError> {
        let presigning = PresigningConfig::expires_in(PRESIGN_TTL)
            .map_err(|e| AppError::S3(format!("presign config: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::S3(format!("presign {key}: {e}")))?;

        Ok(request.uri().to_string())
    }
}
