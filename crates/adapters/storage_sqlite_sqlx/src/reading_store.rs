//! `SQLite` implementation of [`ReadingStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use greencue_app::ports::ReadingStore;
use greencue_domain::error::GreenCueError;
use greencue_domain::id::ReadingId;
use greencue_domain::sensor::{NewReading, SensorReading, SensorType};
use greencue_domain::time::Timestamp;

use crate::codec::{decode_error, decode_timestamp, encode_timestamp, stamp};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(SensorReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let sensor_type: String = row.try_get("sensor_type")?;
        let observed_at: String = row.try_get("observed_at")?;

        Ok(Self(SensorReading {
            id: ReadingId::from_uuid(id),
            sensor_type: SensorType::from_code(&sensor_type).map_err(decode_error)?,
            value: row.try_get("value")?,
            unit: row.try_get("unit")?,
            device_id: row.try_get("device_id")?,
            observed_at: decode_timestamp(&observed_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sensor_readings (id, sensor_type, value, unit, device_id, observed_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_LATEST_PER_TYPE: &str = r"
    SELECT * FROM sensor_readings
    WHERE rowid IN (SELECT MAX(rowid) FROM sensor_readings GROUP BY sensor_type)
    ORDER BY sensor_type
";

const SELECT_RECENT_BY_TYPE: &str = r"
    SELECT * FROM sensor_readings
    WHERE sensor_type = ?
    ORDER BY observed_at DESC, rowid DESC
    LIMIT ?
";

const SELECT_BY_TYPE_IN_RANGE: &str = r"
    SELECT * FROM sensor_readings
    WHERE sensor_type = ? AND observed_at >= ? AND observed_at <= ?
    ORDER BY observed_at DESC, rowid DESC
";

/// `SQLite`-backed sensor reading store.
pub struct SqliteReadingStore {
    pool: SqlitePool,
}

impl SqliteReadingStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReadingStore for SqliteReadingStore {
    async fn save(&self, reading: NewReading) -> Result<SensorReading, GreenCueError> {
        let reading = reading.into_reading(ReadingId::new(), stamp());

        sqlx::query(INSERT)
            .bind(reading.id.as_uuid())
            .bind(reading.sensor_type.code())
            .bind(reading.value)
            .bind(&reading.unit)
            .bind(&reading.device_id)
            .bind(encode_timestamp(&reading.observed_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(reading)
    }

    async fn latest_per_type(&self) -> Result<Vec<SensorReading>, GreenCueError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_LATEST_PER_TYPE)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn recent_by_type(
        &self,
        sensor_type: SensorType,
        limit: u32,
    ) -> Result<Vec<SensorReading>, GreenCueError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT_BY_TYPE)
            .bind(sensor_type.code())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn by_type_in_range(
        &self,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<SensorReading>, GreenCueError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_TYPE_IN_RANGE)
            .bind(sensor_type.code())
            .bind(encode_timestamp(&from))
            .bind(encode_timestamp(&to))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
