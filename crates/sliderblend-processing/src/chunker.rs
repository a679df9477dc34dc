//! Overlapping fixed-size text chunking.
//!
//! Sizes and offsets are counted in `char`s. Chunks never cross a page boundary.

use crate::loader::PageText;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkerError {
    #[error("chunk_size must be greater than 0")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },
}

/// Configuration for chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkerError> {
        if chunk_size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkerError::OverlapTooLarge {
                overlap: chunk_overlap,
                size: chunk_size,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

/// A bounded substring of one page's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub page_number: u32,
    /// Position of the chunk within its page.
    pub index: usize,
    /// Char offset of the chunk's first character within the page text.
    pub start: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split every page, keeping page order. Blank pages produce no chunks.
    pub fn split(&self, pages: &[PageText]) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| self.split_page(page.page_number, &page.text))
            .collect()
    }

    pub fn split_page(&self, page_number: u32, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        if text.trim().is_empty() {
            return chunks;
        }

        let chars: Vec<char> = text.chars().collect();
        let step = self.config.chunk_size - self.config.chunk_overlap;
        let mut start = 0;

        loop {
            let end = (start + self.config.chunk_size).min(chars.len());
            chunks.push(Chunk {
                page_number,
                index: chunks.len(),
                start,
                text: chars[start..end].iter().collect(),
            });

            if end >= chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
