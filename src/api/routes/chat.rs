use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::api::{routes::status_for, state::AppState};
use crate::domain::{Chunk, ConversationEntry};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub query: String,
    #[serde(default)]
    pub context: Vec<Chunk>,
    #[serde(default)]
    pub history: Vec<ConversationEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let chat = state.chat.clone().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let system = request
        .system
        .unwrap_or_else(|| state.config.prompts.chat.system.clone());

    let response = chat
        .run_query(&system, &request.query, &request.context, &request.history)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Chat query failed");
            status_for(&e)
        })?;

    Ok(Json(ChatResponse {
        response,
        model: chat.model_name().to_string(),
    }))
}

pub async fn chat_stream_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let chat = state.chat.clone().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let system = request
        .system
        .unwrap_or_else(|| state.config.prompts.chat.system.clone());

    let mut tokens = chat
        .run_stream_query(&system, &request.query, &request.context, &request.history)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Chat stream failed to start");
            status_for(&e)
        })?;

    let events = async_stream::stream! {
        while let Some(token) = tokens.next().await {
            match token {
                Ok(text) => yield Ok(Event::default().data(text)),
                Err(e) => {
                    tracing::error!(error = %e, "Chat stream broke off");
                    yield Ok(Event::default().event("error").data(e.to_string()));
                    return;
                }
            }
        }
        yield Ok(Event::default().data("[DONE]"));
    };

    Ok(Sse::new(events))
}
