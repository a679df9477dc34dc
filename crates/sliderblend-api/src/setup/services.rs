//! Job store, embedding provider and pipeline wiring.

use anyhow::{Context, Result};
use sliderblend_core::Config;
use sliderblend_db::{EmbeddingRepository, EmbeddingSink};
use sliderblend_services::{create_embedding_provider, Embedder};
use sliderblend_storage::Storage;
use sliderblend_worker::{DocumentPipeline, JobStore, PipelineConfig};
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let job_store = JobStore::connect(config.redis_url(), config.job_ttl())
        .await
        .context("Failed to connect to job store")?;
    tracing::info!(
        backend = job_store.backend_name(),
        ttl_secs = job_store.ttl().as_secs(),
        "Job store initialized"
    );

    let provider =
        create_embedding_provider(config).context("Failed to create embedding provider")?;
    let embedder = Embedder::from_config(provider, config);

    let sink: Arc<dyn EmbeddingSink> = Arc::new(EmbeddingRepository::new(
        pool.clone(),
        config.embedding_dimension(),
    ));

    let pipeline_config =
        PipelineConfig::from_config(config).context("Invalid chunking configuration")?;
    let pipeline = Arc::new(DocumentPipeline::new(
        job_store.clone(),
        storage.clone(),
        embedder,
        sink,
        pipeline_config,
    ));
    tracing::info!(
        chunk_size = config.chunk_size(),
        chunk_overlap = config.chunk_overlap(),
        batch_size = config.embedding_batch_size(),
        "Document pipeline initialized"
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        pool,
        storage,
        job_store,
        pipeline,
    )))
}
