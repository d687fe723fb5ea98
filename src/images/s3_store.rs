// cardsynctool/src/images/s3_store.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::primitives::ByteStream;
use std::path::Path;

use crate::config::SpacesConfig;

/// Destination for mirrored images. `exists` must report a definitive
/// "not found" as `Ok(false)`; any other check failure propagates.
#[async_trait]
pub trait ImageDestination: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;
    async fn put_file(&self, key: &str, file_path: &Path, content_type: &str) -> Result<()>;
}

/// S3-compatible object storage (DigitalOcean Spaces in production).
pub struct S3ImageStore {
    client: s3::Client,
    bucket: String,
    folder_prefix: Option<String>,
}

impl S3ImageStore {
    /// Builds the SDK client once; callers share the store across all
    /// transfer tasks of a run.
    pub async fn connect(spaces_config: &SpacesConfig) -> Self {
        let sdk_config = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .endpoint_url(&spaces_config.endpoint_url)
            .region(Region::new(spaces_config.region.clone()))
            .credentials_provider(s3::config::Credentials::new(
                &spaces_config.access_key_id,
                &spaces_config.secret_access_key,
                None,     // session_token
                None,     // expiry
                "Static", // provider_name
            ))
            .load()
            .await;

        Self {
            client: s3::Client::new(&sdk_config),
            bucket: spaces_config.bucket_name.clone(),
            folder_prefix: spaces_config.folder_prefix.clone(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.folder_prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl ImageDestination for S3ImageStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let full_key = self.full_key(key);
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|service_err| service_err.is_not_found())
                    .unwrap_or(false)
                {
                    return Ok(false);
                }
                Err(err).with_context(|| {
                    format!(
                        "Failed to check existence of s3://{}/{}",
                        self.bucket, full_key
                    )
                })
            }
        }
    }

    async fn put_file(&self, key: &str, file_path: &Path, content_type: &str) -> Result<()> {
        let full_key = self.full_key(key);
        let body = ByteStream::from_path(file_path).await.with_context(|| {
            format!(
                "Failed to create ByteStream from file: {}",
                file_path.display()
            )
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to upload {} to s3://{}/{}",
                    file_path.display(),
                    self.bucket,
                    full_key
                )
            })?;

        Ok(())
    }
}
