//! TurnRepository trait definition.
//!
//! Read and append operations over the conversation log.

use confidant_types::error::RepositoryError;
use confidant_types::turn::{Exchange, Turn};

/// Repository trait for turn persistence.
///
/// Implementations live in confidant-infra (e.g., `SqliteTurnRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait TurnRepository: Send + Sync {
    /// The `limit` most recent turns, oldest first.
    ///
    /// Returns every turn when fewer than `limit` exist, and an empty vector
    /// for an empty log.
    fn recent_turns(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Append a user turn followed by an assistant turn as one unit of work.
    ///
    /// Either both turns are durable afterwards or neither is.
    fn append_exchange(
        &self,
        prompt: &str,
        answer: &str,
    ) -> impl std::future::Future<Output = Result<Exchange, RepositoryError>> + Send;

    /// Total number of turns in the log.
    fn count_turns(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
