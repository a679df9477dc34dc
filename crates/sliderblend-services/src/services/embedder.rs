//! Batched embedding with per-batch deadlines.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sliderblend_core::Config;

use super::embedding::{EmbeddingError, EmbeddingProvider};

/// Splits texts into ordered batches and embeds them one call at a time.
///
/// Output index `i` always corresponds to input text `i`. A failed, timed out or short
/// batch fails the whole call; no partial result is returned.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    dimension: usize,
    batch_timeout: Duration,
}

impl Embedder {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
        dimension: usize,
        batch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            dimension,
            batch_timeout,
        }
    }

    pub fn from_config(provider: Arc<dyn EmbeddingProvider>, config: &Config) -> Self {
        Self::new(
            provider,
            config.embedding_batch_size(),
            config.embedding_dimension(),
            config.embedding_timeout(),
        )
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for (batch_index, batch) in texts.chunks(self.batch_size).enumerate() {
            let start = Instant::now();

            let batch_vectors =
                tokio::time::timeout(self.batch_timeout, self.provider.embed(batch))
                    .await
                    .map_err(|_| EmbeddingError::Timeout(self.batch_timeout))??;

            if batch_vectors.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    actual: batch_vectors.len(),
                });
            }
            if let Some(bad) = batch_vectors.iter().find(|v| v.len() != self.dimension) {
                return Err(EmbeddingError::Dimension {
                    expected: self.dimension,
                    actual: bad.len(),
                });
            }

            tracing::debug!(
                provider = %self.provider.name(),
                batch = batch_index,
                batch_len = batch.len(),
                duration_ms = start.elapsed().as_millis(),
                "Embedded batch"
            );

            vectors.extend(batch_vectors);
        }

        Ok(vectors)
    }
}
