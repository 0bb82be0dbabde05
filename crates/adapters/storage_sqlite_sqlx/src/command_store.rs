//! `SQLite` implementation of [`CommandStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use greencue_app::ports::CommandStore;
use greencue_domain::control::{CommandDraft, CommandKind, ControlCommand, ControlTarget};
use greencue_domain::error::GreenCueError;
use greencue_domain::id::{CommandId, RuleId};

use crate::codec::{decode_error, decode_timestamp, encode_timestamp, stamp};
use crate::error::StorageError;

struct Wrapper(ControlCommand);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let target: String = row.try_get("target")?;
        let command: String = row.try_get("command")?;
        let rule_id: Option<uuid::Uuid> = row.try_get("rule_id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(ControlCommand {
            id: CommandId::from_uuid(id),
            target: target.parse::<ControlTarget>().map_err(decode_error)?,
            command: command.parse::<CommandKind>().map_err(decode_error)?,
            value: row.try_get("value")?,
            rule_id: rule_id.map(RuleId::from_uuid),
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO control_commands (id, target, command, value, rule_id, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_RECENT_BY_TARGET: &str = r"
    SELECT * FROM control_commands
    WHERE target = ?
    ORDER BY created_at DESC, rowid DESC
    LIMIT ?
";

const SELECT_BY_RULE: &str = r"
    SELECT * FROM control_commands
    WHERE rule_id = ?
    ORDER BY created_at DESC, rowid DESC
";

/// `SQLite`-backed control command store.
pub struct SqliteCommandStore {
    pool: SqlitePool,
}

impl SqliteCommandStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CommandStore for SqliteCommandStore {
    async fn save(&self, draft: CommandDraft) -> Result<ControlCommand, GreenCueError> {
        let command = draft.into_command(CommandId::new(), stamp());

        sqlx::query(INSERT)
            .bind(command.id.as_uuid())
            .bind(command.target.code())
            .bind(command.command.code())
            .bind(command.value)
            .bind(command.rule_id.map(RuleId::as_uuid))
            .bind(encode_timestamp(&command.created_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(command)
    }

    async fn recent_by_target(
        &self,
        target: ControlTarget,
        limit: u32,
    ) -> Result<Vec<ControlCommand>, GreenCueError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT_BY_TARGET)
            .bind(target.code())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn by_rule(&self, rule_id: RuleId) -> Result<Vec<ControlCommand>, GreenCueError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_RULE)
            .bind(rule_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
