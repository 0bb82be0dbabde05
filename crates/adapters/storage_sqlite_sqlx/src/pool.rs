//! Opening the gateway database.
//!
//! A [`Database`] owns the `SQLite` pool shared by the reading, rule and
//! command stores. Opening it applies the embedded migrations, so stores
//! built from it can assume the schema is current.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};

use crate::error::StorageError;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the gateway keeps its history.
pub struct Config {
    /// Connection URL, `sqlite://greencue.db?mode=rwc` on disk or
    /// `sqlite::memory:` for a throwaway database.
    pub database_url: String,
}

impl Config {
    /// Open the database described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the URL is not a `SQLite` URL, the file
    /// cannot be opened, or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::open(&self.database_url).await
    }
}

/// Migrated `SQLite` pool.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(url = %database_url, "database ready");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn should_refuse_non_sqlite_url() {
        let result = Config {
            database_url: "postgres://localhost/greencue".to_string(),
        }
        .build()
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn should_create_gateway_tables_on_open() {
        let db = memory_db().await;

        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        assert_eq!(
            names,
            ["automation_rules", "control_commands", "sensor_readings"]
        );
    }

    #[tokio::test]
    async fn should_record_every_applied_migration() {
        let db = memory_db().await;

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(
            usize::try_from(applied).unwrap(),
            sqlx::migrate!("./migrations").iter().count()
        );
    }
}
