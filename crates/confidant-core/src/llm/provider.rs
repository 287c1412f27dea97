//! LlmProvider trait definition.
//!
//! This is the core abstraction the completion client implements. Uses RPITIT
//! for `complete`; [`super::box_provider::BoxLlmProvider`] adds dynamic dispatch.

use confidant_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion backends (the local inference engine, test doubles).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in confidant-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "llama.cpp").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// Errors are returned as-is; callers decide how they surface.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
