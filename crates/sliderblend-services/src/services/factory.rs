use std::sync::Arc;

use sliderblend_core::{Config, EmbeddingProviderKind};

use super::cohere::CohereEmbeddingService;
use super::embedding::{EmbeddingError, EmbeddingProvider};
use super::voyage::VoyageEmbeddingService;

/// Build the embedding provider selected by `EMBEDDING_PROVIDER`.
pub fn create_embedding_provider(
    config: &Config,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let provider: Arc<dyn EmbeddingProvider> = match config.embedding_provider() {
        EmbeddingProviderKind::Cohere => {
            let api_key = config
                .cohere_api_key()
                .ok_or(EmbeddingError::MissingApiKey("cohere"))?;
            Arc::new(CohereEmbeddingService::new(
                api_key.to_string(),
                config.embedding_model().to_string(),
                config.embedding_input_type().to_string(),
                config.embedding_timeout(),
            )?)
        }
        EmbeddingProviderKind::Voyage => {
            let api_key = config
                .voyage_api_key()
                .ok_or(EmbeddingError::MissingApiKey("voyage"))?;
            Arc::new(VoyageEmbeddingService::new(
                api_key.to_string(),
                config.embedding_model().to_string(),
                config.embedding_input_type(),
                config.embedding_timeout(),
            )?)
        }
    };

    tracing::info!(
        provider = %provider.name(),
        model = %provider.model(),
        "Embedding provider initialized"
    );

    Ok(provider)
}
