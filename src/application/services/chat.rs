use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{ChatModel, DiagnosticLog, TokenStream},
    ChatMessage, Chunk, ConversationEntry, DomainError,
};
use crate::infrastructure::TracingLog;

const MODEL_LOG: TracingLog = TracingLog::new("model:Gemini");

/// Grounds a user query in retrieved chunks and prior turns, then asks the model.
///
/// Model failures are returned as-is; there is no retry.
pub struct ChatModelAdapter {
    model: Arc<dyn ChatModel>,
    log: Arc<dyn DiagnosticLog>,
}

impl ChatModelAdapter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            log: Arc::new(MODEL_LOG),
        }
    }

    pub fn with_log(mut self, log: Arc<dyn DiagnosticLog>) -> Self {
        self.log = log;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Ordered message list: system prompt with context, history, then the query.
    pub fn build_messages(
        system: &str,
        user_query: &str,
        supporting_context: &[Chunk],
        past_conversations: &[ConversationEntry],
    ) -> Vec<ChatMessage> {
        let context = supporting_context
            .iter()
            .map(|chunk| chunk.page_content.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let mut messages = Vec::with_capacity(past_conversations.len() + 2);
        messages.push(ChatMessage::system(format!(
            "{system}\nSupporting context: {context}"
        )));
        messages.extend(past_conversations.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(format!("{user_query}?")));
        messages
    }

    #[instrument(skip_all, fields(model = %self.model_name(), context = supporting_context.len(), history = past_conversations.len()))]
    pub async fn run_query(
        &self,
        system: &str,
        user_query: &str,
        supporting_context: &[Chunk],
        past_conversations: &[ConversationEntry],
    ) -> Result<String, DomainError> {
        let messages = self.prepare(system, user_query, supporting_context, past_conversations);
        let response = self.model.invoke(&messages).await?;
        self.log.log("response", &[("text", response.clone())]);
        Ok(response)
    }

    #[instrument(skip_all, fields(model = %self.model_name(), context = supporting_context.len(), history = past_conversations.len()))]
    pub async fn run_stream_query(
        &self,
        system: &str,
        user_query: &str,
        supporting_context: &[Chunk],
        past_conversations: &[ConversationEntry],
    ) -> Result<TokenStream, DomainError> {
        let messages = self.prepare(system, user_query, supporting_context, past_conversations);
        self.model.stream(&messages).await
    }

    fn prepare(
        &self,
        system: &str,
        user_query: &str,
        supporting_context: &[Chunk],
        past_conversations: &[ConversationEntry],
    ) -> Vec<ChatMessage> {
        let messages =
            Self::build_messages(system, user_query, supporting_context, past_conversations);
        self.log.log(
            "Executing model with prompt",
            &[
                ("query", user_query.to_string()),
                ("messages", messages.len().to_string()),
            ],
        );
        messages
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::{MessageRole, Sender};
    use crate::infrastructure::{GeminiChatModel, MemoryLog};

    /// Replays a canned answer and keeps the messages it was given.
    struct ScriptedModel {
        answer: Result<String, DomainError>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedModel {
        fn answering(answer: Result<String, DomainError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, DomainError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            self.answer.clone()
        }

        async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, DomainError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            let answer = self.answer.clone()?;
            let tokens: Vec<Result<String, DomainError>> = answer
                .split_inclusive(' ')
                .map(|t| Ok(t.to_string()))
                .collect();
            Ok(futures::stream::iter(tokens).boxed())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn context() -> Vec<Chunk> {
        vec![
            Chunk::web("Basel is in Switzerland", None),
            Chunk::web("The university was founded in 1460", None),
        ]
    }

    #[test]
    fn test_build_messages_order() {
        let history = vec![ConversationEntry::new(Sender::Ai, "hi")];
        let messages = ChatModelAdapter::build_messages("Be helpful", "How are you", &[], &history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1], ChatMessage::assistant("hi"));
        assert_eq!(messages[2], ChatMessage::user("How are you?"));
    }

    #[test]
    fn test_build_messages_system_includes_context() {
        let messages = ChatModelAdapter::build_messages("Be helpful", "Where", &context(), &[]);
        assert_eq!(
            messages[0].content,
            "Be helpful\nSupporting context: Basel is in Switzerland; The university was founded in 1460"
        );
    }

    #[test]
    fn test_build_messages_maps_every_sender() {
        let history = vec![
            ConversationEntry::new(Sender::User, "q1"),
            ConversationEntry::new(Sender::Ai, "a1"),
            ConversationEntry::new(Sender::System, "note"),
            ConversationEntry::new(Sender::User, "q2"),
        ];
        let roles: Vec<MessageRole> = ChatModelAdapter::build_messages("s", "q3", &[], &history)
            .into_iter()
            .map(|m| m.role)
            .collect();

        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::System,
                MessageRole::User,
                MessageRole::User,
            ]
        );
    }

    #[test]
    fn test_query_mark_is_always_appended() {
        let messages = ChatModelAdapter::build_messages("s", "Already a question?", &[], &[]);
        assert_eq!(messages.last().unwrap().content, "Already a question??");
    }

    #[tokio::test]
    async fn test_run_query_returns_model_text() {
        let model = ScriptedModel::answering(Ok("Fine, thanks.".to_string()));
        let log = Arc::new(MemoryLog::new());
        let adapter = ChatModelAdapter::new(model.clone()).with_log(log.clone());

        let answer = adapter
            .run_query("s", "How are you", &context(), &[])
            .await
            .unwrap();

        assert_eq!(answer, "Fine, thanks.");
        assert_eq!(model.seen.lock().unwrap().len(), 2);
        assert_eq!(
            log.detail("Executing model with prompt", "query").as_deref(),
            Some("How are you")
        );
    }

    #[tokio::test]
    async fn test_run_query_propagates_model_error() {
        let model = ScriptedModel::answering(Err(DomainError::model_status(500, "boom")));
        let adapter = ChatModelAdapter::new(model);

        let err = adapter.run_query("s", "q", &[], &[]).await.unwrap_err();
        assert_eq!(err, DomainError::model_status(500, "boom"));
    }

    #[tokio::test]
    async fn test_run_stream_query_yields_tokens() {
        let model = ScriptedModel::answering(Ok("one two three".to_string()));
        let adapter = ChatModelAdapter::new(model.clone());

        let stream = adapter.run_stream_query("s", "q", &[], &[]).await.unwrap();
        let tokens: Vec<String> = stream.map(|t| t.unwrap()).collect().await;

        assert_eq!(tokens, vec!["one ", "two ", "three"]);
        assert_eq!(model.seen.lock().unwrap().last().unwrap().content, "q?");
    }

    #[tokio::test]
    async fn test_http_500_surfaces_through_adapter() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let model = GeminiChatModel::new("key").with_base_url(server.uri());
        let adapter = ChatModelAdapter::new(Arc::new(model));

        let err = adapter.run_query("s", "q", &[], &[]).await.unwrap_err();
        assert_eq!(err, DomainError::model_status(500, "internal"));
    }
}
