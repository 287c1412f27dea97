//! SQLite turn repository implementation.
//!
//! Implements `TurnRepository` from `confidant-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, reads on the reader
//! pool and the exchange insert as one transaction on the writer.

use confidant_core::chat::repository::TurnRepository;
use confidant_types::error::RepositoryError;
use confidant_types::llm::MessageRole;
use confidant_types::turn::{Exchange, Turn};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TurnRepository`.
#[derive(Clone)]
pub struct SqliteTurnRepository {
    pool: DatabasePool,
}

impl SqliteTurnRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Turn.
struct TurnRow {
    id: i64,
    role: String,
    content: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Turn {
            id: self.id,
            role,
            content: self.content,
        })
    }
}

impl TurnRepository for SqliteTurnRepository {
    async fn recent_turns(&self, limit: u32) -> Result<Vec<Turn>, RepositoryError> {
        // Newest first so LIMIT keeps the most recent rows, then flip to
        // chronological order for the prompt.
        let rows = sqlx::query("SELECT id, role, content FROM chatmessage ORDER BY id DESC LIMIT ?")
            .bind(i64::from(limit))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }
        turns.reverse();

        Ok(turns)
    }

    async fn append_exchange(&self, prompt: &str, answer: &str) -> Result<Exchange, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let user_id = sqlx::query("INSERT INTO chatmessage (role, content) VALUES (?, ?)")
            .bind(MessageRole::User.to_string())
            .bind(prompt)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .last_insert_rowid();

        let assistant_id = sqlx::query("INSERT INTO chatmessage (role, content) VALUES (?, ?)")
            .bind(MessageRole::Assistant.to_string())
            .bind(answer)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .last_insert_rowid();

        // Dropping `tx` without commit rolls both inserts back.
        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Exchange {
            user: Turn {
                id: user_id,
                role: MessageRole::User,
                content: prompt.to_string(),
            },
            assistant: Turn {
                id: assistant_id,
                role: MessageRole::Assistant,
                content: answer.to_string(),
            },
        })
    }

    async fn count_turns(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chatmessage")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::open(&db_path).await.unwrap()
    }

    async fn seed(repo: &SqliteTurnRepository, exchanges: usize) {
        for i in 1..=exchanges {
            repo.append_exchange(&format!("question {i}"), &format!("answer {i}"))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_recent_turns_on_empty_store() {
        let repo = SqliteTurnRepository::new(test_pool().await);

        let turns = repo.recent_turns(10).await.unwrap();
        assert!(turns.is_empty());
        assert_eq!(repo.count_turns().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_exchange_round_trip() {
        let repo = SqliteTurnRepository::new(test_pool().await);

        let exchange = repo
            .append_exchange("<b>最近眠れません</b>", "就寝前の習慣を見直しましょう。\n\n1. 照明")
            .await
            .unwrap();
        assert!(exchange.user.id < exchange.assistant.id);

        let turns = repo.recent_turns(10).await.unwrap();
        assert_eq!(turns, vec![exchange.user, exchange.assistant]);
        assert_eq!(turns[0].content, "<b>最近眠れません</b>");
        assert_eq!(turns[1].content, "就寝前の習慣を見直しましょう。\n\n1. 照明");
    }

    #[tokio::test]
    async fn test_recent_turns_returns_all_when_fewer_than_limit() {
        let repo = SqliteTurnRepository::new(test_pool().await);
        seed(&repo, 2).await;

        let turns = repo.recent_turns(10).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["question 1", "answer 1", "question 2", "answer 2"]
        );
    }

    #[tokio::test]
    async fn test_recent_turns_drops_oldest_and_keeps_chronological_order() {
        let pool = test_pool().await;
        let repo = SqliteTurnRepository::new(pool.clone());

        // 11 turns: a lone system turn followed by five exchanges.
        sqlx::query("INSERT INTO chatmessage (role, content) VALUES ('system', 'oldest')")
            .execute(&pool.writer)
            .await
            .unwrap();
        seed(&repo, 5).await;
        assert_eq!(repo.count_turns().await.unwrap(), 11);

        let turns = repo.recent_turns(10).await.unwrap();
        assert_eq!(turns.len(), 10);
        assert!(turns.iter().all(|t| t.content != "oldest"));
        assert_eq!(turns[0].content, "question 1");
        assert_eq!(turns[9].content, "answer 5");
        assert!(turns.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_exchanges_alternate_roles_in_submission_order() {
        let repo = SqliteTurnRepository::new(test_pool().await);
        seed(&repo, 3).await;

        let turns = repo.recent_turns(100).await.unwrap();
        assert_eq!(turns.len(), 6);
        for (i, pair) in turns.chunks(2).enumerate() {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[0].content, format!("question {}", i + 1));
            assert_eq!(pair[1].role, MessageRole::Assistant);
            assert_eq!(pair[1].content, format!("answer {}", i + 1));
        }
    }

    #[tokio::test]
    async fn test_failed_assistant_insert_rolls_back_user_turn() {
        let repo = SqliteTurnRepository::new(test_pool().await);

        // Empty content violates the CHECK constraint on the second insert.
        let result = repo.append_exchange("Hello", "").await;
        assert!(matches!(result, Err(RepositoryError::Query(_))));
        assert_eq!(repo.count_turns().await.unwrap(), 0);
    }
}
