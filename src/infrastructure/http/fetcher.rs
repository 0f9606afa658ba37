use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::instrument;

use crate::domain::{
    ports::{FetchedPage, PageFetcher},
    DomainError,
};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(Self::with_client(client))
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<FetchedPage, DomainError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(|e| DomainError::fetch(format!("GET {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::fetch(format!("reading {url} failed: {e}")))?;

        tracing::debug!(status, bytes = body.len(), "page fetched");
        Ok(FetchedPage::new(status, body))
    }
}
