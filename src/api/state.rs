use std::sync::Arc;

use crate::application::ChatModelAdapter;
use crate::domain::ports::PageFetcher;
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub chat: Option<Arc<ChatModelAdapter>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: AppConfig) -> Self {
        Self {
            fetcher,
            chat: None,
            config: Arc::new(config),
        }
    }

    pub fn with_chat(mut self, chat: Arc<ChatModelAdapter>) -> Self {
        self.chat = Some(chat);
        self
    }
}
