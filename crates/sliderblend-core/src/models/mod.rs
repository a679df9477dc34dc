//! Data models for the application
//!
//! The Job Record lives in the key-value job store; documents, embeddings and users
//! are relational entities.

mod document;
mod job;
mod user;

pub use document::*;
pub use job::*;
pub use user::*;
