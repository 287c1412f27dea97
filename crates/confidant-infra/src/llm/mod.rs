//! Local model access.
//!
//! [`engine`] owns the inference server process; [`openai_compat`] is the
//! completion client that talks to it. [`create_provider`] wires the two
//! together into the [`BoxLlmProvider`] the chat service consumes.

pub mod engine;
pub mod openai_compat;

use confidant_core::llm::box_provider::BoxLlmProvider;
use confidant_types::config::ModelConfig;

use self::engine::LocalEngine;
use self::openai_compat::OpenAiCompatibleProvider;

/// Build the completion client for a started engine.
pub fn create_provider(engine: &LocalEngine, config: &ModelConfig) -> BoxLlmProvider {
    let mut oai_config = openai_compat::config::local_engine_defaults(config);
    oai_config.base_url = engine.base_url().to_string();
    oai_config.model = engine.model_id().to_string();

    tracing::debug!(
        provider = %oai_config.provider_name,
        model = %oai_config.model,
        "Created completion client"
    );
    BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config))
}
