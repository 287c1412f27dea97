//! Application error type mapping to HTTP status codes and HTML bodies.
//!
//! Responses are small HTML alerts. The page's `htmx-config` swaps 4xx/5xx
//! bodies too, so they land in the history like a normal fragment.
//! Internal details are logged, never sent to the browser.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use confidant_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure inside the chat pipeline.
    Chat(ChatError),
    /// Template rendering failure.
    Render(minijinja::Error),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<minijinja::Error> for AppError {
    fn from(e: minijinja::Error) -> Self {
        AppError::Render(e)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Chat(ChatError::EmptyPrompt) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "メッセージを入力してください。",
            ),
            AppError::Chat(ChatError::Closed) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "サーバーを停止しています。",
            ),
            AppError::Chat(_) | AppError::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "応答を生成できませんでした。しばらくしてからもう一度お試しください。",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            match &self {
                AppError::Chat(e) => tracing::error!(error = %e, "Chat exchange failed"),
                AppError::Render(e) => tracing::error!(error = %e, "Template rendering failed"),
            }
        } else {
            tracing::debug!(%status, "Rejected chat request");
        }

        let body = format!(
            r#"<div class="alert alert-error my-2" role="alert"><span>{message}</span></div>"#
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidant_types::error::RepositoryError;
    use confidant_types::llm::LlmError;

    #[test]
    fn test_empty_prompt_is_unprocessable() {
        let resp = AppError::from(ChatError::EmptyPrompt).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_llm_and_repository_failures_are_internal() {
        let llm = AppError::from(ChatError::from(LlmError::EmptyCompletion)).into_response();
        assert_eq!(llm.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let repo = AppError::from(ChatError::from(RepositoryError::Query("disk full".into())))
            .into_response();
        assert_eq!(repo.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_message_is_opaque() {
        let err = AppError::from(ChatError::from(RepositoryError::Query(
            "secret table detail".into(),
        )));
        let (_, message) = err.status_and_message();
        assert!(!message.contains("secret table detail"));
    }

    #[test]
    fn test_error_body_is_html() {
        let resp = AppError::from(ChatError::EmptyPrompt).into_response();
        let content_type = resp.headers()[axum::http::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }
}
