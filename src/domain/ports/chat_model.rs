use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::{errors::DomainError, ChatMessage};

pub type TokenStream = BoxStream<'static, Result<String, DomainError>>;

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, DomainError>;
    async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, DomainError>;
    fn model_name(&self) -> &str;
}
