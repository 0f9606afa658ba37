use async_trait::async_trait;

use crate::domain::{errors::DomainError, Chunk};

/// Chunks produced by one loader run, plus the error that cut it short, if any.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub chunks: Vec<Chunk>,
    pub error: Option<DomainError>,
}

impl LoadOutcome {
    pub fn complete(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            error: None,
        }
    }

    pub fn truncated(chunks: Vec<Chunk>, error: DomainError) -> Self {
        Self {
            chunks,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_truncated(&self) -> bool {
        self.error.is_some()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl IntoIterator for LoadOutcome {
    type Item = Chunk;
    type IntoIter = std::vec::IntoIter<Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

#[async_trait]
pub trait Loader: Send + Sync {
    fn unique_id(&self) -> &str;
    fn chunk_size(&self) -> usize;
    fn chunk_overlap(&self) -> usize;

    /// Every chunk the loader produced, blank ones included.
    async fn load_unfiltered(&self) -> LoadOutcome;

    async fn load(&self) -> LoadOutcome {
        let mut outcome = self.load_unfiltered().await;
        outcome
            .chunks
            .retain(|chunk| !chunk.page_content.trim().is_empty());
        outcome
    }
}
