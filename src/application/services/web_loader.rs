use async_trait::async_trait;
use futures::Stream;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::instrument;

use crate::application::services::links::discover_links;
use crate::domain::{
    ports::{DiagnosticLog, LoadOutcome, Loader, PageFetcher},
    text::{clean_string, truncate_center_string},
    Chunk, DomainError,
};
use crate::infrastructure::{html_to_text, TextChunker, TracingLog};

pub const DEFAULT_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 0;
const SOURCE_PREVIEW_LEN: usize = 50;

const WEB_LOADER_LOG: TracingLog = TracingLog::new("loader:WebLoader");

/// What a [`WebLoader`] reads: a page to fetch, or HTML handed over directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderSource {
    Url(String),
    Content(String),
}

impl LoaderSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::Content(s) => s,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    fn identity_key(&self) -> String {
        match self {
            Self::Url(url) => format!("URL_{url}"),
            Self::Content(content) => format!("CONTENT_{content}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Turns a web page into overlapping plain-text chunks.
///
/// Failures while fetching or converting never surface as errors; they end
/// the run early and are recorded in the returned [`LoadOutcome`].
pub struct WebLoader {
    id: String,
    source: LoaderSource,
    options: ChunkingOptions,
    chunker: TextChunker,
    fetcher: Arc<dyn PageFetcher>,
    log: Arc<dyn DiagnosticLog>,
}

impl WebLoader {
    pub fn new(
        source: LoaderSource,
        options: ChunkingOptions,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, DomainError> {
        let chunker = TextChunker::new(options.chunk_size, options.chunk_overlap)?;
        Ok(Self {
            id: loader_id(&source),
            source,
            options,
            chunker,
            fetcher,
            log: Arc::new(WEB_LOADER_LOG),
        })
    }

    pub fn from_url(url: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_defaults(LoaderSource::Url(url.into()), fetcher)
    }

    pub fn from_content(content: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_defaults(LoaderSource::Content(content.into()), fetcher)
    }

    fn with_defaults(source: LoaderSource, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            id: loader_id(&source),
            source,
            options: ChunkingOptions::default(),
            chunker: TextChunker::without_overlap(DEFAULT_CHUNK_SIZE),
            fetcher,
            log: Arc::new(WEB_LOADER_LOG),
        }
    }

    pub fn with_chunking(mut self, options: ChunkingOptions) -> Result<Self, DomainError> {
        self.chunker = TextChunker::new(options.chunk_size, options.chunk_overlap)?;
        self.options = options;
        Ok(self)
    }

    pub fn with_log(mut self, log: Arc<dyn DiagnosticLog>) -> Self {
        self.log = log;
        self
    }

    pub fn source(&self) -> &LoaderSource {
        &self.source
    }

    /// Lazily yields the filtered chunks of one run. Not restartable.
    pub fn stream_chunks(&self) -> impl Stream<Item = Chunk> + Send + '_ {
        async_stream::stream! {
            for chunk in self.load().await {
                yield chunk;
            }
        }
    }

    async fn fetch_html(&self) -> Result<String, DomainError> {
        match &self.source {
            LoaderSource::Content(content) => Ok(content.clone()),
            LoaderSource::Url(url) => {
                let page = self.fetcher.get(url).await?;
                if !page.is_success() {
                    return Err(DomainError::fetch(format!(
                        "GET {url} returned status {}",
                        page.status
                    )));
                }
                Ok(page.body)
            }
        }
    }

    async fn extract(&self) -> Result<Vec<String>, DomainError> {
        let html = self.fetch_html().await?;
        let text = html_to_text(&html)?;
        Ok(self.chunker.split(&clean_string(&text)))
    }

    fn source_label(&self) -> Option<String> {
        match &self.source {
            LoaderSource::Url(url) => Some(url.clone()),
            LoaderSource::Content(content) => {
                Some(truncate_center_string(content, SOURCE_PREVIEW_LEN))
            }
        }
    }
}

fn loader_id(source: &LoaderSource) -> String {
    let digest = Sha256::digest(source.identity_key().as_bytes());
    format!("WebLoader_{}", hex::encode(digest))
}

#[async_trait]
impl Loader for WebLoader {
    fn unique_id(&self) -> &str {
        &self.id
    }

    fn chunk_size(&self) -> usize {
        self.options.chunk_size
    }

    fn chunk_overlap(&self) -> usize {
        self.options.chunk_overlap
    }

    #[instrument(skip(self), fields(loader_id = %self.id, url_mode = self.source.is_url()))]
    async fn load_unfiltered(&self) -> LoadOutcome {
        let mut links =
            discover_links(self.fetcher.as_ref(), self.source.as_str(), self.log.as_ref()).await;
        links.push(self.source.as_str().to_string());
        self.log.log(
            "links discovered",
            &[
                ("count", (links.len() - 1).to_string()),
                ("links", links.join(", ")),
            ],
        );

        match self.extract().await {
            Ok(texts) => {
                let source = self.source_label();
                let chunks = texts
                    .into_iter()
                    .map(|text| Chunk::web(text, source.clone()))
                    .collect::<Vec<_>>();
                tracing::debug!(chunks = chunks.len(), "page split");
                LoadOutcome::complete(chunks)
            }
            Err(e) => {
                self.log.log(
                    "Could not parse input",
                    &[
                        ("source", self.source.as_str().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                LoadOutcome::truncated(Vec::new(), e)
            }
        }
    }
}
