use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// Characters left as-is inside a single key segment of a public URL.
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("The resource was not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage bucket holding the material files.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Stores `data` under `key` and returns the stored path.
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<String>;

    /// Removes `key`. Fails with `StorageError::NotFound` when nothing is stored there.
    async fn delete_file(&self, key: &str) -> StorageResult<()>;

    async fn file_exists(&self, key: &str) -> StorageResult<bool>;

    /// Publicly retrievable URL of a stored object.
    async fn get_public_url(&self, key: &str) -> StorageResult<String>;
}

pub fn public_url_for(base: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
    public_base_url: Option<String>,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String, public_base_url: Option<String>) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(data))
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: {}/{}, error={:?}",
                self.bucket,
                key,
                e
            );
            return Err(StorageError::Other(e.into()));
        }
        Ok(key.to_string())
    }

    async fn delete_file(&self, key: &str) -> StorageResult<()> {
        // S3 deletes are silent for missing keys, so look first.
        if !self.file_exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Other(e.into()))?;
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> StorageResult<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::Other(anyhow::anyhow!(service_error)))
                }
            }
        }
    }

    async fn get_public_url(&self, key: &str) -> StorageResult<String> {
        let base = self.public_base_url.as_deref().ok_or_else(|| {
            StorageError::Other(anyhow::anyhow!(
                "No public URL configured for bucket '{}'",
                self.bucket
            ))
        })?;
        Ok(public_url_for(base, key))
    }
}
