//! SQLite-backed history store

use crate::context::models::Turn;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Per-identity append-only log of (message, response) pairs
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one completed turn for the identity
    async fn append(
        &self,
        identity: &str,
        user_message: &str,
        assistant_response: &str,
    ) -> Result<Turn>;

    /// All turns for the identity in chronological order, oldest first
    async fn list(&self, identity: &str) -> Result<Vec<Turn>>;

    /// Delete every turn for the identity; returns the number removed
    async fn clear(&self, identity: &str) -> Result<u64>;
}

/// SQLite implementation over a WAL-mode pool.
///
/// Single-statement operations are atomic; concurrent events for the same
/// identity are not serialized beyond that (a documented limitation).
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

/// Internal row type for SQLite-to-domain mapping
struct TurnRow {
    id: i64,
    phone_number: String,
    message: String,
    response: String,
    timestamp: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            phone_number: row.try_get("phone_number")?,
            message: row.try_get("message")?,
            response: row.try_get("response")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_turn(self) -> Result<Turn> {
        let created_at = parse_datetime(&self.timestamp)?;
        Ok(Turn {
            id: self.id,
            identity: self.phone_number,
            user_message: self.message,
            assistant_response: self.response,
            created_at,
        })
    }
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RelayError::Persistence(format!("invalid timestamp {raw:?}: {e}")))
}

impl SqliteHistoryStore {
    /// Open the database, enable WAL, and run migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RelayError::Configuration(format!("invalid database url: {e}")))?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| RelayError::Persistence(format!("failed to open database: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RelayError::Persistence(format!("migration failed: {e}")))?;

        info!(database_url, "history store ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(
        &self,
        identity: &str,
        user_message: &str,
        assistant_response: &str,
    ) -> Result<Turn> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO message_history (phone_number, message, response, timestamp) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(identity)
        .bind(user_message)
        .bind(assistant_response)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RelayError::Persistence(format!("failed to append turn: {e}")))?;

        let id = result.last_insert_rowid();
        debug!(identity, id, "turn persisted");

        Ok(Turn {
            id,
            identity: identity.to_string(),
            user_message: user_message.to_string(),
            assistant_response: assistant_response.to_string(),
            created_at,
        })
    }

    async fn list(&self, identity: &str) -> Result<Vec<Turn>> {
        let rows = sqlx::query(
            "SELECT id, phone_number, message, response, timestamp \
             FROM message_history WHERE phone_number = ? \
             ORDER BY timestamp ASC, id ASC",
        )
        .bind(identity)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelayError::Persistence(format!("failed to load history: {e}")))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn = TurnRow::from_row(row)
                .map_err(|e| RelayError::Persistence(format!("failed to read turn row: {e}")))?
                .into_turn()?;
            turns.push(turn);
        }
        Ok(turns)
    }

    async fn clear(&self, identity: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM message_history WHERE phone_number = ?")
            .bind(identity)
            .execute(&self.pool)
            .await
            .map_err(|e| RelayError::Persistence(format!("failed to clear history: {e}")))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_in(dir: &tempfile::TempDir) -> SqliteHistoryStore {
        let db_path = dir.path().join("history.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        SqliteHistoryStore::connect(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_then_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        store.append("+15551234", "hi", "hello").await.unwrap();
        store.append("+15551234", "how are you", "fine").await.unwrap();

        let turns = store.list("+15551234").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].user_message, "hi");
        assert_eq!(turns[1].user_message, "how are you");
        assert!(turns[0].id < turns[1].id);
    }

    #[tokio::test]
    async fn test_list_unknown_identity_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let turns = store.list("+440000000").await.unwrap();
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn test_clear_only_affects_one_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        store.append("+15551234", "a", "b").await.unwrap();
        store.append("+15551234", "c", "d").await.unwrap();
        store.append("+61400000", "e", "f").await.unwrap();

        let removed = store.clear("+15551234").await.unwrap();
        assert_eq!(removed, 2);

        assert!(store.list("+15551234").await.unwrap().is_empty());
        assert_eq!(store.list("+61400000").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_on_empty_history_removes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let removed = store.clear("+15551234").await.unwrap();
        assert_eq!(removed, 0);
    }
}
