//! Shared fixtures for pipeline tests: PDF builder, storage/provider/sink fakes and a
//! recording key-value store.

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream};
use sliderblend_core::models::{Job, NewDocumentEmbedding, ProcessState};
use sliderblend_core::StorageBackend;
use sliderblend_db::{EmbeddingSink, PersistenceError};
use sliderblend_services::{EmbeddingError, EmbeddingProvider};
use sliderblend_storage::{Storage, StorageError, StorageResult};
use sliderblend_worker::{JobStoreError, KeyValueStore, MemoryKeyValueStore};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

pub const DIMENSION: usize = 8;

/// One page per entry, each page showing its text on a single line.
pub fn build_pdf(pages: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT\n/F1 10 Tf\n50 742 Td\n({}) Tj\nET\n", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Storage whose every operation fails like a dropped connection.
pub struct UnreachableStorage;

#[async_trait]
impl Storage for UnreachableStorage {
    async fn upload(&self, _: &str, _: &str, _: &str, _: Vec<u8>) -> StorageResult<String> {
        Err(StorageError::BackendError("connection reset".to_string()))
    }

    async fn upload_with_key(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<()> {
        Err(StorageError::BackendError("connection reset".to_string()))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::DownloadFailed(format!(
            "{}: connection reset",
            key
        )))
    }

    async fn delete(&self, _: &str) -> StorageResult<()> {
        Err(StorageError::BackendError("connection reset".to_string()))
    }

    async fn exists(&self, _: &str) -> StorageResult<bool> {
        Err(StorageError::BackendError("connection reset".to_string()))
    }

    async fn presigned_url(&self, _: &str, _: Duration) -> StorageResult<String> {
        Err(StorageError::BackendError("connection reset".to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Storage whose downloads hang for `delay`, like a stalled object store.
pub struct StalledStorage {
    pub delay: Duration,
}

#[async_trait]
impl Storage for StalledStorage {
    async fn upload(&self, folder: &str, filename: &str, _: &str, _: Vec<u8>) -> StorageResult<String> {
        Ok(format!("{}/{}", folder, filename))
    }

    async fn upload_with_key(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn download(&self, _: &str) -> StorageResult<Vec<u8>> {
        tokio::time::sleep(self.delay).await;
        Ok(build_pdf(&["late".to_string()]))
    }

    async fn delete(&self, _: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn exists(&self, _: &str) -> StorageResult<bool> {
        Ok(true)
    }

    async fn presigned_url(&self, key: &str, _: Duration) -> StorageResult<String> {
        Ok(format!("http://stalled.invalid/{}", key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Embedding provider with scriptable misbehaviour.
#[derive(Default)]
pub struct FakeProvider {
    pub calls: Mutex<usize>,
    /// Drop one vector from the response of this call.
    pub short_on_call: Option<usize>,
    pub panic_on_call: Option<usize>,
    pub delay: Option<Duration>,
}

#[async_trait]
impl EmbeddingProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if self.panic_on_call == Some(call) {
            panic!("provider exploded");
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|t| vec![t.chars().count() as f32; DIMENSION])
            .collect();
        if self.short_on_call == Some(call) {
            vectors.pop();
        }
        Ok(vectors)
    }
}

/// In-memory stand-in for the relational store with the same all-or-nothing contract.
#[derive(Default)]
pub struct RecordingSink {
    pub rows: Mutex<HashMap<Uuid, Vec<NewDocumentEmbedding>>>,
    pub fail_with_constraint: bool,
}

impl RecordingSink {
    pub fn rows_for(&self, document_id: Uuid) -> Vec<NewDocumentEmbedding> {
        self.rows
            .lock()
            .unwrap()
            .get(&document_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_embedded(&self, document_id: Uuid) -> bool {
        self.rows.lock().unwrap().contains_key(&document_id)
    }
}

#[async_trait]
impl EmbeddingSink for RecordingSink {
    async fn store_document_embeddings(
        &self,
        document_id: Uuid,
        rows: Vec<NewDocumentEmbedding>,
    ) -> Result<u64, PersistenceError> {
        if self.fail_with_constraint {
            return Err(PersistenceError::Constraint(
                "document_embeddings_document_id_fkey".to_string(),
            ));
        }
        let count = rows.len() as u64;
        self.rows.lock().unwrap().insert(document_id, rows);
        Ok(count)
    }
}

/// Memory store that remembers the state of every job write, in order.
#[derive(Default)]
pub struct RecordingKv {
    pub inner: MemoryKeyValueStore,
    pub writes: Mutex<Vec<ProcessState>>,
    pub fail_writes_after: Option<usize>,
}

impl RecordingKv {
    pub fn states(&self) -> Vec<ProcessState> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingKv {
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), JobStoreError> {
        {
            let writes = self.writes.lock().unwrap();
            if self.fail_writes_after.is_some_and(|n| writes.len() >= n) {
                return Err(JobStoreError::Connection("redis went away".to_string()));
            }
        }
        if let Ok(job) = serde_json::from_str::<Job>(&value) {
            self.writes.lock().unwrap().push(job.process_state);
        }
        self.inner.set_ex(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, JobStoreError> {
        self.inner.get(key).await
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, JobStoreError> {
        self.inner.mget(keys).await
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, JobStoreError> {
        self.inner.scan(pattern).await
    }

    async fn del(&self, keys: &[String]) -> Result<u64, JobStoreError> {
        self.inner.del(keys).await
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
