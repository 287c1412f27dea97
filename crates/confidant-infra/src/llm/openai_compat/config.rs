//! Configuration for the OpenAI-compatible completion client.
//!
//! The local engine (llama.cpp `llama-server` or any server speaking the
//! OpenAI chat completions protocol) gets its [`OpenAiCompatConfig`] from the
//! `[model]` section of the application config.

use secrecy::SecretString;

use confidant_types::config::ModelConfig;

/// Placeholder bearer token for engines started without `--api-key`.
const NO_API_KEY: &str = "no-key";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "llama.cpp").
    pub provider_name: String,
    /// Base URL for the API (e.g., "http://127.0.0.1:8080/v1").
    pub base_url: String,
    /// Bearer token for authentication.
    pub api_key: SecretString,
    /// Model identifier sent when a request leaves `model` empty.
    pub model: String,
}

/// Defaults for the local inference engine described by `model`.
pub fn local_engine_defaults(model: &ModelConfig) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "llama.cpp".into(),
        base_url: model.base_url.trim_end_matches('/').to_string(),
        api_key: SecretString::from(
            model.api_key.clone().unwrap_or_else(|| NO_API_KEY.to_string()),
        ),
        model: model.model_id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_local_engine_defaults() {
        let model = ModelConfig {
            base_url: "http://127.0.0.1:8080/v1/".to_string(),
            ..ModelConfig::default()
        };

        let config = local_engine_defaults(&model);
        assert_eq!(config.provider_name, "llama.cpp");
        assert_eq!(config.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.model, "qwen2.5-3b-instruct-q4_k_m");
        assert_eq!(config.api_key.expose_secret(), "no-key");
    }

    #[test]
    fn test_local_engine_defaults_with_key() {
        let model = ModelConfig {
            api_key: Some("sk-local".to_string()),
            ..ModelConfig::default()
        };

        let config = local_engine_defaults(&model);
        assert_eq!(config.api_key.expose_secret(), "sk-local");
    }
}
