use page_rag::api::{create_router, AppState};
use page_rag::application::ChatModelAdapter;
use page_rag::infrastructure::{AppConfig, GeminiChatModel, HttpPageFetcher};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,page_rag=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    info!(model = %config.config.llm.model, "Configuration loaded");

    let fetcher = match &config.config.loader.user_agent {
        Some(agent) => HttpPageFetcher::with_user_agent(agent)?,
        None => HttpPageFetcher::new(),
    };

    let llm = &config.config.llm;
    let chat = match GeminiChatModel::from_env(llm.temperature, Some(&llm.model)) {
        Ok(model) => {
            let model = model.with_base_url(llm.base_url.clone());
            Some(Arc::new(ChatModelAdapter::new(Arc::new(model))))
        }
        Err(e) => {
            warn!(error = %e, "chat endpoints are disabled");
            None
        }
    };

    if config.config.server.is_exposed_without_key() {
        warn!(
            host = %config.config.server.host,
            "no API key configured; /api/v1/chunks will fetch URLs for any client"
        );
    }

    let addr = SocketAddr::new(
        config.config.server.host.parse()?,
        config.config.server.port,
    );

    let mut state = AppState::new(Arc::new(fetcher), config);
    if let Some(chat) = chat {
        state = state.with_chat(chat);
    }
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
