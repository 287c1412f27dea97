use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in confidant-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}

/// Errors from a single chat exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("chat service is shutting down")]
    Closed,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_chat_error_is_transparent_over_sources() {
        let err: ChatError = LlmError::EmptyCompletion.into();
        assert_eq!(err.to_string(), "model returned an empty completion");

        let err: ChatError = RepositoryError::Query("database is locked".into()).into();
        assert_eq!(err.to_string(), "query error: database is locked");
    }
}
