//! Chat service sequencing one exchange end to end.
//!
//! ChatService coordinates the TurnRepository and the LlmProvider:
//! read recent history, assemble the prompt, generate a completion, and
//! persist the user/assistant pair. Nothing is written unless generation
//! succeeds.

use std::time::{Duration, Instant};

use confidant_types::config::AppConfig;
use confidant_types::error::{ChatError, RepositoryError};
use confidant_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use confidant_types::turn::{Exchange, Turn};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::chat::prompt::{DEFAULT_PERSONA, build_messages};
use crate::chat::repository::TurnRepository;
use crate::llm::provider::LlmProvider;

/// Per-exchange parameters.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub persona: String,
    pub history_limit: u32,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub generation_timeout: Option<Duration>,
    pub max_concurrent_exchanges: usize,
}

impl ChatSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            persona: config
                .chat
                .persona
                .clone()
                .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
            history_limit: config.chat.history_limit,
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
            generation_timeout: config.model.request_timeout_secs.map(Duration::from_secs),
            max_concurrent_exchanges: config.chat.max_concurrent_exchanges,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Orchestrates history, prompt assembly, completion, and persistence.
///
/// Generic over `TurnRepository` and `LlmProvider` so the pipeline runs
/// against in-memory doubles in tests and SQLite + the local engine in
/// production.
///
/// Each exchange holds a permit for its whole duration. With the default of
/// one permit, exchanges run strictly one after another: the loaded model
/// never serves two generations at once, and every exchange sees all earlier
/// exchanges in its history.
pub struct ChatService<R: TurnRepository, P: LlmProvider> {
    repo: R,
    provider: P,
    settings: ChatSettings,
    permits: Semaphore,
}

impl<R: TurnRepository, P: LlmProvider> ChatService<R, P> {
    pub fn new(repo: R, provider: P, settings: ChatSettings) -> Self {
        let permits = Semaphore::new(settings.max_concurrent_exchanges.max(1));
        Self {
            repo,
            provider,
            settings,
            permits,
        }
    }

    /// Access the turn repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// The configured number of most recent turns, oldest first.
    pub async fn recent_history(&self) -> Result<Vec<Turn>, RepositoryError> {
        self.repo.recent_turns(self.settings.history_limit).await
    }

    /// Run one chat exchange for `prompt` and return the persisted pair.
    ///
    /// Failure at any step propagates unchanged. Because the turns are
    /// written only after a completion is in hand, a failed generation
    /// leaves the log untouched.
    pub async fn exchange(&self, prompt: &str) -> Result<Exchange, ChatError> {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let _permit = self.permits.acquire().await.map_err(|_| ChatError::Closed)?;

        let history = self.recent_history().await?;
        let request = CompletionRequest {
            model: String::new(),
            messages: build_messages(&self.settings.persona, &history, prompt),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
        };
        debug!(
            history_turns = history.len(),
            messages = request.messages.len(),
            "Prompt assembled"
        );

        let started = Instant::now();
        let response = self.generate(&request).await?;
        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion.into());
        }
        let response_ms = started.elapsed().as_millis() as u64;

        let exchange = self.repo.append_exchange(prompt, &response.content).await?;

        info!(
            provider = self.provider.name(),
            user_turn = exchange.user.id,
            assistant_turn = exchange.assistant.id,
            response_ms,
            stop_reason = %response.stop_reason,
            "Exchange persisted"
        );

        Ok(exchange)
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match self.settings.generation_timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.complete(request))
                .await
                .map_err(|_| LlmError::Timeout(limit.as_secs()))?,
            None => self.provider.complete(request).await,
        }
    }
}
