use serde::{Deserialize, Serialize};

/// Loader that produced a chunk. Serialized as the `type` tag of the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderKind {
    WebLoader,
}

impl LoaderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebLoader => "WebLoader",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(rename = "type")]
    pub kind: LoaderKind,
    pub source: Option<String>,
}

/// A bounded span of text plus the metadata describing where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(rename = "pageContent")]
    pub page_content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(page_content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    pub fn web(page_content: impl Into<String>, source: Option<String>) -> Self {
        Self::new(
            page_content,
            ChunkMetadata {
                kind: LoaderKind::WebLoader,
                source,
            },
        )
    }
}
