use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::{routes::status_for, state::AppState};
use crate::application::{ChunkingOptions, LoaderSource, WebLoader};
use crate::domain::{ports::Loader, Chunk};

#[derive(Debug, Deserialize)]
pub struct LoadChunksRequest {
    pub url: Option<String>,
    pub content: Option<String>,
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LoadChunksResponse {
    pub loader_id: String,
    pub chunks: Vec<Chunk>,
    pub complete: bool,
    pub error: Option<String>,
}

pub async fn load_chunks(
    State(state): State<AppState>,
    Json(request): Json<LoadChunksRequest>,
) -> Result<Json<LoadChunksResponse>, StatusCode> {
    let source = match (request.content, request.url) {
        (Some(content), _) => LoaderSource::Content(content),
        (None, Some(url)) => LoaderSource::Url(url),
        (None, None) => return Err(StatusCode::BAD_REQUEST),
    };

    let defaults = &state.config.config.loader;
    let options = ChunkingOptions {
        chunk_size: request.chunk_size.unwrap_or(defaults.chunk_size),
        chunk_overlap: request.chunk_overlap.unwrap_or(defaults.chunk_overlap),
    };

    let loader = WebLoader::new(source, options, state.fetcher.clone()).map_err(|e| {
        tracing::warn!(error = %e, "Rejected loader options");
        status_for(&e)
    })?;

    let outcome = loader.load().await;
    Ok(Json(LoadChunksResponse {
        loader_id: loader.unique_id().to_string(),
        complete: outcome.is_complete(),
        error: outcome.error.as_ref().map(ToString::to_string),
        chunks: outcome.chunks,
    }))
}
