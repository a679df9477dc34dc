//! Sliderblend Services Layer
//!
//! Embedding model clients and the batching `Embedder` the ingestion pipeline calls.
//! Providers sit behind the `EmbeddingProvider` capability so the backend is chosen by
//! configuration and tests can swap in their own.

pub mod services;

pub use services::{
    cohere::CohereEmbeddingService,
    embedder::Embedder,
    embedding::{EmbeddingError, EmbeddingProvider},
    factory::create_embedding_provider,
    voyage::VoyageEmbeddingService,
};
