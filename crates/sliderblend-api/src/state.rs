//! Application state shared by every handler.

use sliderblend_core::Config;
use sliderblend_db::{DocumentRepository, UserRepository};
use sliderblend_processing::DocumentValidator;
use sliderblend_storage::Storage;
use sliderblend_worker::{DocumentPipeline, JobStore};
use sqlx::PgPool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub users: UserRepository,
    pub documents: DocumentRepository,
    pub storage: Arc<dyn Storage>,
    pub job_store: JobStore,
    pub pipeline: Arc<DocumentPipeline>,
    pub validator: DocumentValidator,
}

impl AppState {
    /// Repositories and the upload validator are derived from `pool` and `config`.
    pub fn new(
        config: Config,
        pool: PgPool,
        storage: Arc<dyn Storage>,
        job_store: JobStore,
        pipeline: Arc<DocumentPipeline>,
    ) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            validator: DocumentValidator::pdf(config.max_document_size_bytes()),
            config,
            pool,
            storage,
            job_store,
            pipeline,
        }
    }
}
