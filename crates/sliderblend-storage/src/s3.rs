use crate::keys::{generate_storage_key, validate_key};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use std::time::{Duration, Instant};

/// Object storage on any S3-compatible service.
///
/// Production decks live on Filebase (`S3_ENDPOINT=https://s3.filebase.com`); MinIO works
/// the same way for local stacks. Credentials come from the standard `AWS_*` variables.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

fn object_path(storage_key: &str) -> StorageResult<Path> {
    validate_key(storage_key)?;
    Ok(Path::from(storage_key))
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl S3Storage {
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            // MinIO in docker-compose is plain http
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::debug!(bucket = %bucket, "S3 client configured");
        Ok(S3Storage { store, bucket })
    }

    async fn put_object(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()> {
        let location = object_path(storage_key)?;
        let size_bytes = data.len();
        let start = Instant::now();

        if let Err(e) = self
            .store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await
        {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes,
                "Failed to store object"
            );
            return Err(StorageError::UploadFailed(e.to_string()));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes,
            duration_ms = elapsed_ms(start),
            "Stored object"
        );
        Ok(())
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let storage_key = generate_storage_key(folder, filename);
        self.put_object(&storage_key, data).await?;
        Ok(storage_key)
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.put_object(storage_key, data).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let location = object_path(storage_key)?;
        let start = Instant::now();

        let fetched = match self.store.get(&location).await {
            Ok(result) => result.bytes().await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(bytes) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = bytes.len(),
                    duration_ms = elapsed_ms(start),
                    "Fetched object"
                );
                Ok(bytes.to_vec())
            }
            Err(ObjectStoreError::NotFound { .. }) => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = elapsed_ms(start),
                    "Failed to fetch object"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let location = object_path(storage_key)?;

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::info!(bucket = %self.bucket, key = %storage_key, "Deleted object");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = object_path(storage_key)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = object_path(storage_key)?;
        self.store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map(|url| url.to_string())
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
