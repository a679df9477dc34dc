//! PDF text extraction.

use thiserror::Error;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Payload is not a PDF document")]
    NotPdf,

    #[error("Malformed PDF: {0}")]
    Malformed(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("Document contains no extractable text")]
    Empty,
}

/// Extracted text of one page. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Extracts page-level text from an in-memory PDF.
///
/// Parsing is CPU-bound; async callers should run it on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Returns one entry per page in page order. A page whose text cannot be decoded
    /// yields an empty string rather than failing the whole document.
    pub fn load(&self, bytes: &[u8]) -> Result<Vec<PageText>, LoadError> {
        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(LoadError::NotPdf);
        }

        let doc =
            lopdf::Document::load_mem(bytes).map_err(|e| LoadError::Malformed(e.to_string()))?;

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(LoadError::NoPages);
        }

        let mut result = Vec::with_capacity(pages.len());
        for (page_number, _) in pages {
            let text = match doc.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(
                        page_number,
                        error = %e,
                        "Failed to extract page text, treating page as empty"
                    );
                    String::new()
                }
            };
            result.push(PageText { page_number, text });
        }

        tracing::debug!(page_count = result.len(), "PDF loaded");

        Ok(result)
    }
}
