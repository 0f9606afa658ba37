use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Raw response of a page fetch. The status is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fails only when no response was received (bad URL, transport error).
    async fn get(&self, url: &str) -> Result<FetchedPage, DomainError>;
}
