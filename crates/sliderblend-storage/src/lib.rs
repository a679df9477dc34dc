//! Sliderblend Storage Library
//!
//! Object store capability interface (`Storage`) with S3-compatible and local filesystem
//! implementations, selected at start-up by configuration.
//!
//! # Storage key format
//!
//! Every backend lays keys out as `{folder}/{sanitized-filename}`, or just the sanitized
//! file name when the folder is empty. Keys must not contain `..` or a leading `/`.
//! Key generation is centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use sliderblend_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
