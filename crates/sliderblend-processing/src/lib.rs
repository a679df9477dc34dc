//! Sliderblend document processing
//!
//! Turns an uploaded PDF into page texts (`loader`), splits page texts into overlapping
//! chunks (`chunker`) and validates uploads before they reach storage (`validator`).

pub mod chunker;
pub mod loader;
pub mod validator;

pub use chunker::{Chunk, ChunkConfig, ChunkerError, TextChunker};
pub use loader::{LoadError, PageText, PdfLoader};
pub use validator::{DocumentValidator, ValidationError};
