#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use sliderblend_core::Config;
use std::sync::Arc;

#[allow(dead_code)]
fn required(value: Option<&str>, variable: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", variable)))
}

/// Build the backend named by `STORAGE_BACKEND` (S3 when unset).
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend().unwrap_or(StorageBackend::S3) {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                required(config.s3_bucket(), "S3_BUCKET")?,
                required(config.s3_region(), "S3_REGION")?,
                config.s3_endpoint().map(String::from),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?,
                required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?,
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[allow(unreachable_patterns)]
        other => Err(StorageError::ConfigError(format!(
            "{:?} storage backend not compiled in",
            other
        ))),
    }
}
