pub mod config;
pub mod http;
pub mod llm;
pub mod logging;
pub mod text;

pub use config::{AppConfig, ChatPrompts, Config, LlmConfig, LoaderConfig, PromptsConfig};
pub use http::HttpPageFetcher;
pub use llm::GeminiChatModel;
pub use logging::{MemoryLog, TracingLog};
pub use text::{html_to_text, TextChunker};
