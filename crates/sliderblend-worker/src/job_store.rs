//! Job Store facade
//!
//! Serialises records to JSON and keeps them in a [`KeyValueStore`] with a fixed TTL.
//! Expired records behave exactly like records that never existed.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use sliderblend_core::models::{Job, ProcessState, JOB_KEY_PREFIX};

use crate::kv::{KeyValueStore, MemoryKeyValueStore, RedisKeyValueStore};

/// `REDIS_URL` value that selects the in-process store.
pub const MEMORY_STORE_URL: &str = "memory://";

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Job store connection error: {0}")]
    Connection(String),

    #[error("Job store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Clone)]
pub struct JobStore {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl JobStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    /// In-process store, for tests and single-node development.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()), ttl)
    }

    /// Connect to Redis, or build an in-memory store for `memory://`.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, JobStoreError> {
        if url.starts_with(MEMORY_STORE_URL) {
            tracing::warn!("Using in-memory job store; jobs are lost on restart");
            return Ok(Self::in_memory(ttl));
        }
        let kv = RedisKeyValueStore::connect(url).await?;
        Ok(Self::new(Arc::new(kv), ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.kv.backend_name()
    }

    pub async fn put<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), JobStoreError> {
        let payload = serde_json::to_string(value)?;
        self.kv.set_ex(key, payload, self.ttl).await
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, JobStoreError> {
        let payload = self
            .kv
            .get(key)
            .await?
            .ok_or_else(|| JobStoreError::NotFound(key.to_string()))?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// One entry per key, in order; absent keys yield `None`.
    pub async fn get_many<T: DeserializeOwned>(
        &self,
        keys: &[String],
    ) -> Result<Vec<Option<T>>, JobStoreError> {
        self.kv
            .mget(keys)
            .await?
            .into_iter()
            .map(|payload| {
                payload
                    .map(|p| serde_json::from_str(&p))
                    .transpose()
                    .map_err(JobStoreError::from)
            })
            .collect()
    }

    /// Every live record whose key matches `pattern`. Keys that expire between the scan
    /// and the fetch are skipped.
    pub async fn get_all<T: DeserializeOwned>(&self, pattern: &str) -> Result<Vec<T>, JobStoreError> {
        let keys = self.kv.scan(pattern).await?;
        Ok(self
            .get_many(&keys)
            .await?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Returns whether the key existed.
    pub async fn delete(&self, key: &str) -> Result<bool, JobStoreError> {
        Ok(self.kv.del(&[key.to_string()]).await? > 0)
    }

    pub async fn delete_many(&self, keys: &[String]) -> Result<u64, JobStoreError> {
        self.kv.del(keys).await
    }

    pub async fn create_job(&self, job: &Job) -> Result<(), JobStoreError> {
        self.put(&job.key(), job).await?;
        tracing::debug!(job_id = %job.job_id, state = %job.process_state, "Job created");
        Ok(())
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<Job, JobStoreError> {
        self.get(&Job::key_for(job_id)).await
    }

    /// Overwrite the stored snapshot and restart its TTL.
    pub async fn update_job(&self, job: &Job) -> Result<(), JobStoreError> {
        self.put(&job.key(), job).await
    }

    pub async fn get_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Option<Job>>, JobStoreError> {
        let keys: Vec<String> = job_ids.iter().map(|id| Job::key_for(*id)).collect();
        self.get_many(&keys).await
    }

    pub async fn get_all_jobs(&self) -> Result<Vec<Job>, JobStoreError> {
        self.get_all(&format!("{}*", JOB_KEY_PREFIX)).await
    }

    pub async fn jobs_by_state(&self, state: ProcessState) -> Result<Vec<Job>, JobStoreError> {
        Ok(self
            .get_all_jobs()
            .await?
            .into_iter()
            .filter(|job| job.process_state == state)
            .collect())
    }

    pub async fn count_by_state(&self, state: ProcessState) -> Result<usize, JobStoreError> {
        Ok(self.jobs_by_state(state).await?.len())
    }

    pub async fn delete_job(&self, job_id: Uuid) -> Result<bool, JobStoreError> {
        self.delete(&Job::key_for(job_id)).await
    }
}
