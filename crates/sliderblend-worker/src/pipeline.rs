//! Document ingestion pipeline
//!
//! `fetch → load → chunk → embed → persist`, driven by one owned Job snapshot. Each
//! state change is written to the job store before the next stage starts, so a poller
//! never sees progress that has not happened. Any failure, deadline or panic ends the
//! job in `failed`; `run` itself never fails.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use sliderblend_core::models::{Job, NewDocumentEmbedding, ProcessState};
use sliderblend_core::{Config, TransitionError};
use sliderblend_db::{EmbeddingSink, PersistenceError};
use sliderblend_processing::{ChunkConfig, ChunkerError, LoadError, PdfLoader, TextChunker};
use sliderblend_services::{Embedder, EmbeddingError};
use sliderblend_storage::{Storage, StorageError};

use crate::job_store::{JobStore, JobStoreError};

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub chunk: ChunkConfig,
    /// Deadline for downloading the source document.
    pub fetch_timeout: Duration,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Result<Self, ChunkerError> {
        Ok(Self {
            chunk: ChunkConfig::new(config.chunk_size(), config.chunk_overlap())?,
            fetch_timeout: config.storage_fetch_timeout(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Job metadata is missing {0}")]
    MissingMetadata(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Document load error: {0}")]
    Load(#[from] LoadError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Job store error: {0}")]
    JobStore(#[from] JobStoreError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Stage {stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    #[error("Pipeline panicked: {0}")]
    Panicked(String),
}

impl PipelineError {
    /// Stage name used in failure logs.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::MissingMetadata(_) => "start",
            PipelineError::Storage(_) => "fetch",
            PipelineError::Load(_) => "load",
            PipelineError::Embedding(_) => "embed",
            PipelineError::Persistence(_) => "persist",
            PipelineError::JobStore(_) | PipelineError::Transition(_) => "transition",
            PipelineError::Timeout { stage, .. } => *stage,
            PipelineError::Panicked(_) => "unknown",
        }
    }
}

pub struct DocumentPipeline {
    job_store: JobStore,
    storage: Arc<dyn Storage>,
    loader: PdfLoader,
    chunker: TextChunker,
    embedder: Embedder,
    sink: Arc<dyn EmbeddingSink>,
    fetch_timeout: Duration,
}

impl DocumentPipeline {
    pub fn new(
        job_store: JobStore,
        storage: Arc<dyn Storage>,
        embedder: Embedder,
        sink: Arc<dyn EmbeddingSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            job_store,
            storage,
            loader: PdfLoader::new(),
            chunker: TextChunker::new(config.chunk),
            embedder,
            sink,
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Run the job on its own task. The handle resolves to the final snapshot.
    pub fn spawn(self: &Arc<Self>, job: Job) -> JoinHandle<Job> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(job).await })
    }

    /// Drive `job` to a terminal state and return the final snapshot.
    #[tracing::instrument(skip(self, job), fields(job_id = %job.job_id))]
    pub async fn run(&self, job: Job) -> Job {
        let started = Instant::now();
        let mut current = job;

        let outcome = AssertUnwindSafe(self.execute(&mut current))
            .catch_unwind()
            .await;

        let error = match outcome {
            Ok(Ok(())) => {
                tracing::info!(
                    job_id = %current.job_id,
                    document_id = ?current.document_id(),
                    duration_ms = started.elapsed().as_millis(),
                    "Document pipeline completed"
                );
                return current;
            }
            Ok(Err(e)) => e,
            Err(panic) => PipelineError::Panicked(panic_message(panic.as_ref())),
        };

        tracing::error!(
            job_id = %current.job_id,
            document_id = ?current.document_id(),
            stage = error.stage(),
            error = %error,
            duration_ms = started.elapsed().as_millis(),
            "Document pipeline failed"
        );

        self.fail(current).await
    }

    async fn execute(&self, current: &mut Job) -> Result<(), PipelineError> {
        let document_id = current
            .document_id()
            .ok_or(PipelineError::MissingMetadata("document_id"))?;
        let file_key = current
            .file_key()
            .ok_or(PipelineError::MissingMetadata("file_key"))?
            .to_string();

        // Flushed before any I/O so a crash mid-fetch leaves an in-progress record.
        self.transition(current, ProcessState::Embedding).await?;

        let fetch_started = Instant::now();
        let bytes = tokio::time::timeout(self.fetch_timeout, self.storage.download(&file_key))
            .await
            .map_err(|_| PipelineError::Timeout {
                stage: "fetch",
                after: self.fetch_timeout,
            })??;
        tracing::debug!(
            key = %file_key,
            size_bytes = bytes.len(),
            duration_ms = fetch_started.elapsed().as_millis(),
            "Fetched source document"
        );

        let loader = self.loader;
        let pages = tokio::task::spawn_blocking(move || loader.load(&bytes))
            .await
            .map_err(|e| PipelineError::Panicked(format!("document loader: {}", e)))??;

        let chunks = self.chunker.split(&pages);
        if chunks.is_empty() {
            return Err(LoadError::Empty.into());
        }
        tracing::debug!(
            document_id = %document_id,
            pages = pages.len(),
            chunks = chunks.len(),
            "Chunked document"
        );

        let (page_numbers, texts): (Vec<u32>, Vec<String>) =
            chunks.into_iter().map(|c| (c.page_number, c.text)).unzip();

        let vectors = self.embedder.embed(&texts).await?;

        let rows: Vec<NewDocumentEmbedding> = page_numbers
            .into_iter()
            .zip(texts)
            .zip(vectors)
            .map(|((page_number, text), embedding)| NewDocumentEmbedding {
                page_number: page_number as i32,
                text,
                embedding,
            })
            .collect();

        self.sink
            .store_document_embeddings(document_id, rows)
            .await?;

        self.transition(current, ProcessState::Completed).await
    }

    /// Persist the next snapshot, then adopt it.
    async fn transition(&self, current: &mut Job, next: ProcessState) -> Result<(), PipelineError> {
        let advanced = current.clone().advance(next)?;
        self.job_store.update_job(&advanced).await?;
        tracing::info!(
            job_id = %advanced.job_id,
            from = %current.process_state,
            to = %next,
            "Job state transition"
        );
        *current = advanced;
        Ok(())
    }

    /// Best effort: a store failure here is logged, never raised.
    async fn fail(&self, current: Job) -> Job {
        let from = current.process_state;
        let failed = match current.clone().advance(ProcessState::Failed) {
            Ok(failed) => failed,
            Err(e) => {
                tracing::warn!(job_id = %current.job_id, error = %e, "Job already terminal");
                return current;
            }
        };

        match self.job_store.update_job(&failed).await {
            Ok(()) => tracing::info!(
                job_id = %failed.job_id,
                from = %from,
                to = %ProcessState::Failed,
                "Job state transition"
            ),
            Err(e) => tracing::error!(
                job_id = %failed.job_id,
                error = %e,
                "Failed to persist failed job state"
            ),
        }

        failed
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
