//! Application state wiring all services together.
//!
//! The chat service is generic over its repository and provider traits;
//! AppState pins it to the concrete infra implementations. Everything here is
//! built once at startup and shared by every request.

use std::sync::Arc;

use confidant_core::chat::service::{ChatService, ChatSettings};
use confidant_core::llm::box_provider::BoxLlmProvider;
use confidant_infra::llm::create_provider;
use confidant_infra::llm::engine::LocalEngine;
use confidant_infra::sqlite::pool::DatabasePool;
use confidant_infra::sqlite::turn::SqliteTurnRepository;
use confidant_types::config::AppConfig;

use crate::http::views::Views;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteTurnRepository, BoxLlmProvider>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub views: Arc<Views>,
    engine: Option<Arc<LocalEngine>>,
}

impl AppState {
    /// Open the database, bring the inference engine up, and wire the chat
    /// service. Any failure aborts startup.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::open(&config.database.path).await?;
        tracing::info!(path = %config.database.path.display(), "Database ready");

        let engine = LocalEngine::start(&config.model).await?;
        let provider = create_provider(&engine, &config.model);

        let mut state = Self::from_parts(
            SqliteTurnRepository::new(db_pool),
            provider,
            ChatSettings::from_config(config),
        )?;
        state.engine = Some(Arc::new(engine));
        Ok(state)
    }

    /// Assemble state from already-constructed parts.
    pub fn from_parts(
        repo: SqliteTurnRepository,
        provider: BoxLlmProvider,
        settings: ChatSettings,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            chat_service: Arc::new(ChatService::new(repo, provider, settings)),
            views: Arc::new(Views::new()?),
            engine: None,
        })
    }

    /// Stop the inference server if this process started it.
    pub async fn shutdown(&self) {
        if let Some(engine) = &self.engine {
            engine.shutdown().await;
        }
    }
}
