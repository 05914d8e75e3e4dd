use crate::{domain::FileStorage, errors::StorageError};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::{Client as S3Client, primitives::ByteStream};
use tracing;

#[derive(Debug, Clone)]
pub struct S3FileStorage {
    client: S3Client,
    bucket_name: String,
    // Public/CDN base for stored object URLs; falls back to the bucket URL
    media_base_url: Option<String>,
    region: String,
}

impl S3FileStorage {
    pub fn new(
        client: S3Client,
        bucket_name: String,
        region: String,
        media_base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket_name,
            media_base_url,
            region,
        }
    }

    /// URL the uploaded object can be retrieved from. Posts store this URL
    /// verbatim, so it must stay valid for the document's lifetime.
    fn object_url(&self, key: &str) -> String {
        match &self.media_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket_name, self.region, key
            ),
        }
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    /// Uploads data to S3 using PutObject and returns the retrieval URL.
    /// Sets Content-Type.
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String, StorageError> {
        let content_type =
            content_type.unwrap_or_else(|| "application/octet-stream".to_string());
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, content_type = %content_type, "S3: Uploading file");

        let body = ByteStream::from(data);
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(body)
            // --- Set the Content-Type metadata on the S3 object ---
            .content_type(content_type)
            .send()
            .await
            .context(format!("S3: Failed to upload object with key '{}'", key))
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?; // Map to specific upload error

        let url = self.object_url(key);
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, %url, "S3: Upload successful");
        Ok(url)
    }
}
