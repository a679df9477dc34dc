use crate::keys::{generate_storage_key, validate_key};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Suffix of the scratch file a write goes through before it is renamed into place.
const PARTIAL_SUFFIX: &str = ".part";

/// Filesystem storage for development and tests.
///
/// Files are written to a scratch name and renamed, so a pipeline that downloads a key
/// while it is being uploaded sees either nothing or the whole document.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// `base_path` is created if missing; `base_url` prefixes the URLs handed out by
    /// `presigned_url` (e.g. "http://localhost:3000/files").
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Resolve a key below `base_path`, refusing anything that escapes it.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);
        let root = self.base_path.canonicalize()?;
        if let Ok(canonical) = path.canonicalize() {
            if !canonical.starts_with(&root) {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn write_atomically(&self, storage_key: &str, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.resolve(storage_key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        let write = async {
            let mut file = fs::File::create(&partial).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&partial, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            )));
        }

        Ok(path)
    }

    async fn store(&self, storage_key: &str, data: &[u8]) -> StorageResult<()> {
        let start = Instant::now();
        let path = self.write_atomically(storage_key, data).await?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored file"
        );
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let storage_key = generate_storage_key(folder, filename);
        self.store(&storage_key, &data).await?;
        Ok(storage_key)
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.store(storage_key, &data).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(key = %storage_key, size_bytes = data.len(), "Read file");
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.resolve(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %storage_key, "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.resolve(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn presigned_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        self.resolve(storage_key)?;
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            storage_key
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    async fn storage_in(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/files".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let data = b"%PDF-1.5 test".to_vec();
        let key = storage
            .upload("documents", "report.pdf", "application/pdf", data.clone())
            .await
            .unwrap();

        assert_eq!(key, "documents/report.pdf");
        assert!(storage.exists(&key).await.unwrap());
        assert_eq!(storage.download(&key).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_download_missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.download("documents/missing.pdf").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        storage
            .upload_with_key("documents/a.pdf", b"x".to_vec(), "application/pdf")
            .await
            .unwrap();
        storage.delete("documents/a.pdf").await.unwrap();
        storage.delete("documents/a.pdf").await.unwrap();
        assert!(!storage.exists("documents/a.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_upload_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        storage
            .upload_with_key("documents/a.pdf", b"%PDF-1.5".to_vec(), "application/pdf")
            .await
            .unwrap();

        assert!(dir.path().join("documents/a.pdf").exists());
        assert!(!dir.path().join("documents/a.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_presigned_url_uses_base_url() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let url = storage
            .presigned_url("documents/a.pdf", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/files/documents/a.pdf");
    }
}
