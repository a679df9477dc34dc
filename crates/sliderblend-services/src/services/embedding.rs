//! Embedding model abstraction.

use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Embedding provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Failed to decode embedding response: {0}")]
    Decode(String),

    #[error("Embedding count mismatch: submitted {expected} texts, received {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Embedding batch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Missing API key for embedding provider {0}")]
    MissingApiKey(&'static str),
}

/// One call to an embedding model.
///
/// Implementations embed every text in `texts` with a single request and return the
/// vectors in input order. Batching, deadlines and count checks are the caller's job
/// (see [`Embedder`](super::Embedder)).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name used in logs (e.g. "cohere").
    fn name(&self) -> &str;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Turn a non-2xx response into `EmbeddingError::Provider`, keeping the body for logs.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, EmbeddingError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(EmbeddingError::Provider { status, body })
}
