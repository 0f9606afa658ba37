mod gemini;

pub use gemini::{GeminiChatModel, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
