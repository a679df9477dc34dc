//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{sanitized-filename}`, or the bare sanitized name for an empty folder.

use crate::{StorageError, StorageResult};

/// Replace anything outside `[A-Za-z0-9._-]` with `_` and drop dot runs that could
/// form a parent-directory reference.
pub fn sanitize_filename(filename: &str) -> String {
    let mapped: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut sanitized = mapped.trim_start_matches('.').to_string();
    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }

    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Generate a storage key for the given folder and filename.
pub fn generate_storage_key(folder: &str, filename: &str) -> String {
    let folder = folder.trim_matches('/');
    let name = sanitize_filename(filename);
    if folder.is_empty() {
        name
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Reject keys that could escape the storage root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
