//! Job store and document ingestion pipeline.
//!
//! The job store keeps short-lived Job Records in a key-value service (Redis, or an
//! in-process map for tests and single-node development). The pipeline moves one job
//! from `not_started` to a terminal state, writing every transition back to the store
//! before the next stage begins.

pub mod job_store;
pub mod kv;
pub mod pipeline;

pub use job_store::{JobStore, JobStoreError};
pub use kv::{KeyValueStore, MemoryKeyValueStore, RedisKeyValueStore};
pub use pipeline::{DocumentPipeline, PipelineConfig, PipelineError};
