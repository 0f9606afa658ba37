use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::{
    ports::{ChatModel, TokenStream},
    ChatMessage, DomainError, MessageRole,
};

pub const DEFAULT_MODEL: &str = "gemini-1.0-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Chat model served by the hosted Gemini `generateContent` API.
pub struct GeminiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

impl GeminiChatModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        }
    }

    /// Reads the key from `GEMINI_API_KEY`; an empty value counts as unset.
    pub fn from_env(
        temperature: Option<f32>,
        model_name: Option<&str>,
    ) -> Result<Self, DomainError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DomainError::validation(format!("{API_KEY_ENV} is not set")))?;
        Ok(Self::with_options(api_key, temperature, model_name))
    }

    fn with_options(
        api_key: impl Into<String>,
        temperature: Option<f32>,
        model_name: Option<&str>,
    ) -> Self {
        Self {
            temperature,
            model: model_name.unwrap_or(DEFAULT_MODEL).to_string(),
            ..Self::new(api_key)
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model,
            method
        )
    }

    fn request_body<'a>(&self, messages: &'a [ChatMessage]) -> GenerateContentRequest<'a> {
        let (system, rest) = match messages.split_first() {
            Some((first, rest)) if first.role == MessageRole::System => (Some(first), rest),
            _ => (None, messages),
        };

        GenerateContentRequest {
            system_instruction: system.map(|m| Content {
                role: None,
                parts: vec![Part { text: &m.content }],
            }),
            contents: rest
                .iter()
                .map(|m| Content {
                    role: Some(gemini_role(m.role)),
                    parts: vec![Part { text: &m.content }],
                })
                .collect(),
            generation_config: self
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }

    async fn send(
        &self,
        method: &str,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, DomainError> {
        let response = self
            .client
            .post(self.endpoint(method))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(|e| DomainError::model(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::model_status(status.as_u16(), body));
        }
        Ok(response)
    }
}

/// Gemini only knows `user` and `model`; system turns after the first ride as `user`.
fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::Assistant => "model",
        MessageRole::System | MessageRole::User => "user",
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, DomainError> {
        let response: GenerateContentResponse = self
            .send("generateContent", messages)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::model(format!("invalid response: {e}")))?;

        Ok(response.text())
    }

    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, DomainError> {
        let response = self.send("streamGenerateContent?alt=sse", messages).await?;
        Ok(parse_sse(response.bytes_stream()).boxed())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Turns an SSE byte stream of `GenerateContentResponse` events into text tokens.
///
/// Bytes are buffered until a full line arrives, so a character split across
/// network chunks is decoded whole.
fn parse_sse<S, B, E>(bytes: S) -> impl futures::Stream<Item = Result<String, DomainError>> + Send
where
    S: futures::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            let line: Vec<u8> = match buffer.iter().position(|b| *b == b'\n') {
                Some(line_end) => buffer.drain(..=line_end).collect(),
                None => match bytes.next().await {
                    Some(Ok(chunk)) => {
                        buffer.extend_from_slice(chunk.as_ref());
                        continue;
                    }
                    Some(Err(e)) => {
                        yield Err(DomainError::model(format!("stream read error: {e}")));
                        return;
                    }
                    // Last event may arrive without a trailing newline.
                    None if !buffer.is_empty() => std::mem::take(&mut buffer),
                    None => return,
                },
            };

            match parse_event(&line) {
                Ok(Some(text)) => yield Ok(text),
                Ok(None) => {}
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    }
}

/// Text carried by one SSE line, if it is a non-empty `data:` event.
fn parse_event(line: &[u8]) -> Result<Option<String>, DomainError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| DomainError::model(format!("invalid utf-8 in stream: {e}")))?;
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(None);
    };
    let event = serde_json::from_str::<GenerateContentResponse>(data.trim())
        .map_err(|e| DomainError::model(format!("invalid stream event: {e}")))?;
    let text = event.text();
    Ok((!text.is_empty()).then_some(text))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
