//! Database repositories
//!
//! Each repository owns a `PgPool` handle and maps driver errors into `PersistenceError`.
//! Writes that must land together (embedding rows and the document's "is embedded"
//! flag) share a single transaction inside the repository.

pub mod document;
pub mod embedding;
pub mod error;
pub mod user;

pub use document::DocumentRepository;
pub use embedding::{EmbeddingRepository, EmbeddingSink};
pub use error::PersistenceError;
pub use user::UserRepository;
