pub mod cohere;
pub mod embedder;
pub mod embedding;
pub mod factory;
pub mod voyage;

pub use cohere::CohereEmbeddingService;
pub use embedder::Embedder;
pub use embedding::{EmbeddingError, EmbeddingProvider};
pub use factory::create_embedding_provider;
pub use voyage::VoyageEmbeddingService;
