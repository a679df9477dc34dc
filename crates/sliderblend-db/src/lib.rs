//! Relational persistence for users, documents and document embeddings.

pub mod db;

pub use db::{
    DocumentRepository, EmbeddingRepository, EmbeddingSink, PersistenceError, UserRepository,
};
