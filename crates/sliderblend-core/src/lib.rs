//! Sliderblend Core Library
//!
//! Domain models, error types and configuration shared by every Sliderblend crate:
//! the Job Record and its state machine, the document and user entities, `AppError`
//! and the environment-driven `Config`.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, EmbeddingProviderKind, IngestionConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Job, JobMetadata, ProcessState, TransitionError};
pub use storage_types::StorageBackend;
