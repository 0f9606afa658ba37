use text_splitter::{ChunkConfig, TextSplitter};

use crate::domain::DomainError;

/// Recursive splitter sized in characters. Chunks come back trimmed.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::validation(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| DomainError::validation(e.to_string()))?
            .with_trim(true);

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    /// Skips validation; `chunk_size` must be non-zero.
    pub fn without_overlap(chunk_size: usize) -> Self {
        Self {
            splitter: TextSplitter::new(ChunkConfig::new(chunk_size).with_trim(true)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.splitter.chunks(text).map(str::to_string).collect()
    }
}
