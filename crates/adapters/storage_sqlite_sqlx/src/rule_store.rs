//! `SQLite` implementation of [`RuleStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use greencue_app::ports::RuleStore;
use greencue_domain::automation::{AutomationRule, NewRule};
use greencue_domain::error::GreenCueError;
use greencue_domain::id::RuleId;

use crate::codec::{decode_timestamp, encode_timestamp, stamp};
use crate::error::StorageError;

struct Wrapper(AutomationRule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(AutomationRule {
            id: RuleId::from_uuid(id),
            condition: row.try_get("condition")?,
            action: row.try_get("action")?,
            active: row.try_get("active")?,
            created_at: decode_timestamp(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO automation_rules (id, condition, action, active, created_at)
    VALUES (?, ?, ?, ?, ?)
";

const SELECT_ACTIVE: &str = r"
    SELECT * FROM automation_rules
    WHERE active = 1
    ORDER BY created_at ASC, rowid ASC
";

const SELECT_BY_ID: &str = "SELECT * FROM automation_rules WHERE id = ?";

const UPDATE_ACTIVE: &str = "UPDATE automation_rules SET active = ? WHERE id = ?";

/// `SQLite`-backed automation rule store.
pub struct SqliteRuleStore {
    pool: SqlitePool,
}

impl SqliteRuleStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleStore for SqliteRuleStore {
    async fn save(&self, rule: NewRule) -> Result<AutomationRule, GreenCueError> {
        let rule = rule.into_rule(RuleId::new(), stamp());

        sqlx::query(INSERT)
            .bind(rule.id.as_uuid())
            .bind(&rule.condition)
            .bind(&rule.action)
            .bind(rule.active)
            .bind(encode_timestamp(&rule.created_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn find_active(&self) -> Result<Vec<AutomationRule>, GreenCueError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ACTIVE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, GreenCueError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn toggle_active(
        &self,
        id: RuleId,
        active: bool,
    ) -> Result<Option<AutomationRule>, GreenCueError> {
        let result = sqlx::query(UPDATE_ACTIVE)
            .bind(active)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
