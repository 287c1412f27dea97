//! OpenAI-compatible completion client for the local inference engine.
//!
//! llama.cpp's `llama-server` (and most other local runtimes) expose the
//! OpenAI chat completions protocol, so a single [`OpenAiCompatibleProvider`]
//! built on [`async_openai`] covers them all via a configurable base URL.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};
use secrecy::ExposeSecret;
use tracing::Instrument;

use confidant_core::llm::provider::LlmProvider;
use confidant_observe::genai_attrs::{
    GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_RESPONSE_ID, GEN_AI_USAGE_INPUT_TOKENS,
    GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT,
};
use confidant_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Completion client for any OpenAI-compatible endpoint.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the bearer token.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request.messages.iter().map(to_openai_message).collect();

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: request.max_tokens,
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        }
    }

    /// Span for one completion call. Usage, finish reason and response id are
    /// declared empty and recorded once the engine answers.
    fn completion_span(&self, model: &str, request: &CompletionRequest) -> tracing::Span {
        tracing::info_span!(
            "chat",
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = %self.provider_name,
            gen_ai.request.model = %model,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.max_tokens = ?request.max_tokens,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            gen_ai.response.id = tracing::field::Empty,
        )
    }
}

fn to_openai_message(msg: &Message) -> ChatCompletionRequestMessage {
    match msg.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request);

        let span = self.completion_span(&oai_request.model, request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .instrument(span.clone())
            .await
            .map_err(map_openai_error)?;

        // Extract content from the first choice
        let first = response.choices.first();
        let content = first
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let stop_reason = first
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Length => StopReason::MaxTokens,
                // Stop, content filter, tool/function calls: the turn is over.
                _ => StopReason::EndTurn,
            })
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        span.record(GEN_AI_USAGE_INPUT_TOKENS, usage.input_tokens);
        span.record(GEN_AI_USAGE_OUTPUT_TOKENS, usage.output_tokens);
        span.record(GEN_AI_RESPONSE_FINISH_REASONS, stop_reason.to_string().as_str());
        span.record(GEN_AI_RESPONSE_ID, response.id.as_str());

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
///
/// Recognizes the error shapes llama-server returns while the model is still
/// loading (503) and when the prompt overflows the context window.
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "context_length_exceeded"
                || error_type == "exceed_context_size_error"
                || api_err.message.contains("context size")
                || api_err.message.contains("maximum context length")
            {
                LlmError::ContextLengthExceeded(api_err.message.clone())
            } else if error_type == "unavailable_error" || api_err.message.contains("Loading model")
            {
                LlmError::ModelNotLoaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(503) => LlmError::ModelNotLoaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidant_types::config::ModelConfig;

    fn local_provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(config::local_engine_defaults(&ModelConfig::default()))
    }

    #[test]
    fn test_local_provider_name() {
        let provider = local_provider();
        assert_eq!(provider.name(), "llama.cpp");
        assert_eq!(provider.model, "qwen2.5-3b-instruct-q4_k_m");
    }

    #[test]
    fn test_build_request_keeps_message_order() {
        let provider = local_provider();
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![
                Message::new(MessageRole::System, "Be kind"),
                Message::new(MessageRole::User, "Hello"),
                Message::new(MessageRole::Assistant, "Hi there!"),
                Message::new(MessageRole::User, "How are you?"),
            ],
            max_tokens: None,
            temperature: Some(0.7),
        };

        let oai_req = provider.build_request(&request);
        assert_eq!(oai_req.model, "qwen2.5-3b-instruct-q4_k_m");
        assert_eq!(oai_req.messages.len(), 4);
        assert!(matches!(
            oai_req.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            oai_req.messages[2],
            ChatCompletionRequestMessage::Assistant(_)
        ));
        assert!(matches!(
            oai_req.messages[3],
            ChatCompletionRequestMessage::User(_)
        ));
        assert_eq!(oai_req.temperature, Some(0.7));
        assert!(oai_req.max_completion_tokens.is_none());
        assert!(oai_req.stream.is_none());
    }

    #[test]
    fn test_build_request_explicit_model_wins() {
        let provider = local_provider();
        let request = CompletionRequest {
            model: "other-model".to_string(),
            messages: vec![],
            max_tokens: Some(256),
            temperature: None,
        };

        let oai_req = provider.build_request(&request);
        assert_eq!(oai_req.model, "other-model");
        assert_eq!(oai_req.max_completion_tokens, Some(256));
    }

    #[test]
    fn test_completion_span_declares_recorded_fields() {
        let provider = local_provider();
        let subscriber = tracing_subscriber::registry();

        tracing::subscriber::with_default(subscriber, || {
            let span = provider.completion_span("qwen", &hello_request());
            let fields = span.metadata().unwrap().fields();
            // Span::record silently ignores names the span never declared.
            for name in [
                GEN_AI_USAGE_INPUT_TOKENS,
                GEN_AI_USAGE_OUTPUT_TOKENS,
                GEN_AI_RESPONSE_FINISH_REASONS,
                GEN_AI_RESPONSE_ID,
            ] {
                assert!(fields.field(name).is_some(), "{name}");
            }
        });
    }

    /// Answer one request on an ephemeral port with a canned JSON body.
    async fn serve_json_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Drain the whole request (headers + JSON body) before replying.
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn provider_for(base_url: String) -> OpenAiCompatibleProvider {
        let model = ModelConfig {
            base_url,
            ..ModelConfig::default()
        };
        OpenAiCompatibleProvider::new(config::local_engine_defaults(&model))
    }

    fn hello_request() -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![
                Message::new(MessageRole::System, "Be kind"),
                Message::new(MessageRole::User, "Hello"),
            ],
            max_tokens: None,
            temperature: Some(0.7),
        }
    }

    const STOP_BODY: &str = r#"{
        "id": "chatcmpl-42",
        "object": "chat.completion",
        "created": 1760000000,
        "model": "qwen2.5-3b-instruct-q4_k_m",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "ゆっくり休みましょう。"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 31, "completion_tokens": 9, "total_tokens": 40}
    }"#;

    const LENGTH_BODY: &str = r#"{
        "id": "chatcmpl-43",
        "object": "chat.completion",
        "created": 1760000000,
        "model": "qwen2.5-3b-instruct-q4_k_m",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "途中で"},
            "finish_reason": "length"
        }],
        "usage": {"prompt_tokens": 31, "completion_tokens": 2, "total_tokens": 33}
    }"#;

    #[tokio::test]
    async fn test_complete_parses_normal_stop_as_end_turn() {
        let url = serve_json_once("200 OK", STOP_BODY).await;
        let provider = provider_for(url);

        let response = provider.complete(&hello_request()).await.unwrap();

        assert_eq!(response.id, "chatcmpl-42");
        assert_eq!(response.content, "ゆっくり休みましょう。");
        assert_eq!(response.model, "qwen2.5-3b-instruct-q4_k_m");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(
            response.usage,
            Usage {
                input_tokens: 31,
                output_tokens: 9
            }
        );
    }

    #[tokio::test]
    async fn test_complete_parses_length_as_max_tokens() {
        let url = serve_json_once("200 OK", LENGTH_BODY).await;
        let provider = provider_for(url);

        let response = provider.complete(&hello_request()).await.unwrap();

        assert_eq!(response.content, "途中で");
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
    }

    #[test]
    fn test_map_openai_error_context_size() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "the request exceeds the available context size".to_string(),
            r#type: Some("exceed_context_size_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::ContextLengthExceeded(_)));
    }

    #[test]
    fn test_map_openai_error_loading_model() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Loading model".to_string(),
            r#type: Some("unavailable_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::ModelNotLoaded(_)));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
