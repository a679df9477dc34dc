use std::path::Path;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Missing file extension: {0}")]
    MissingExtension(String),

    #[error("File content does not match its extension")]
    InvalidSignature,

    #[error("Empty file")]
    EmptyFile,
}

/// Validates uploaded documents before they are stored.
pub struct DocumentValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl DocumentValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Only `.pdf` uploads are accepted.
    pub fn pdf(max_file_size: usize) -> Self {
        Self::new(max_file_size, vec!["pdf".to_string()])
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension (case-insensitive)
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Reject payloads that do not start with the PDF header.
    pub fn validate_signature(&self, data: &[u8]) -> Result<(), ValidationError> {
        if !data.starts_with(PDF_SIGNATURE) {
            return Err(ValidationError::InvalidSignature);
        }
        Ok(())
    }

    /// Run every check in order: name, size, content.
    pub fn validate(&self, filename: &str, data: &[u8]) -> Result<(), ValidationError> {
        self.validate_extension(filename)?;
        self.validate_file_size(data.len())?;
        self.validate_signature(data)
    }
}
