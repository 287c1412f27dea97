//! `confidant history`: show the tail of the conversation log.

use std::path::Path;

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use confidant_core::chat::repository::TurnRepository;
use confidant_infra::sqlite::pool::DatabasePool;
use confidant_infra::sqlite::turn::SqliteTurnRepository;
use confidant_types::config::AppConfig;
use confidant_types::turn::{MessageRole, Turn};

/// Longest content shown in a table cell before truncation.
const MAX_CELL_CHARS: usize = 80;

pub async fn show_history(config: &AppConfig, limit: Option<u32>, json: bool) -> Result<()> {
    let pool = open_existing(&config.database.path).await?;
    let repo = SqliteTurnRepository::new(pool);
    let turns = repo
        .recent_turns(limit.unwrap_or(config.chat.history_limit))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  {} No conversation yet. Start one with: {}",
            style("i").blue().bold(),
            style("confidant serve").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", history_table(&turns));
    println!();
    println!(
        "  {} of {} turn{}",
        style(turns.len()).bold(),
        style(repo.count_turns().await?).bold(),
        if turns.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Open the conversation database without creating it.
///
/// `DatabasePool::open` creates a missing file; a read-only command must not
/// leave an empty database behind at a mistyped path.
async fn open_existing(path: &Path) -> Result<DatabasePool> {
    if !path.exists() {
        bail!(
            "no conversation database at {}; start one with `confidant serve` \
             or point `database.path` at an existing file",
            path.display()
        );
    }
    Ok(DatabasePool::open(path).await?)
}

fn history_table(turns: &[Turn]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for turn in turns {
        let role_cell = match turn.role {
            MessageRole::User => Cell::new("user").fg(Color::Cyan),
            MessageRole::Assistant => Cell::new("assistant").fg(Color::Green),
            MessageRole::System => Cell::new("system").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(turn.id).fg(Color::DarkGrey),
            role_cell,
            Cell::new(truncate(&turn.content, MAX_CELL_CHARS)),
        ]);
    }

    table
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("眠れない夜が続いています", 6), "眠れな...");
        assert_eq!(truncate("眠れない夜が続いています", 6).chars().count(), 6);
    }

    #[tokio::test]
    async fn test_open_existing_refuses_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("typo.db");

        let err = open_existing(&db_path).await.unwrap_err();
        assert!(err.to_string().contains("confidant serve"));
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_open_existing_reads_created_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("confidant.db");
        drop(DatabasePool::open(&db_path).await.unwrap());

        let repo = SqliteTurnRepository::new(open_existing(&db_path).await.unwrap());
        assert_eq!(repo.count_turns().await.unwrap(), 0);
    }

    #[test]
    fn test_history_table_has_row_per_turn() {
        let turns = vec![
            Turn {
                id: 1,
                role: MessageRole::User,
                content: "hi".to_string(),
            },
            Turn {
                id: 2,
                role: MessageRole::Assistant,
                content: "hello".to_string(),
            },
        ];
        let table = history_table(&turns);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("assistant"));
        assert!(rendered.contains("hello"));
    }
}
