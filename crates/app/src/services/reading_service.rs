//! Reading service: persistence, caching and broadcast of sensor readings.

use greencue_domain::error::{GreenCueError, ValidationError};
use greencue_domain::sensor::{NewReading, SensorReading, SensorType};
use greencue_domain::time::Timestamp;

use crate::ports::{BroadcastChannel, LatestValueCache, READING_CHANNEL, ReadingStore};

/// Application service for recording and querying readings.
pub struct ReadingService<R, C, B> {
    store: R,
    cache: C,
    broadcast: B,
}

impl<R, C, B> ReadingService<R, C, B>
where
    R: ReadingStore,
    C: LatestValueCache,
    B: BroadcastChannel,
{
    pub fn new(store: R, cache: C, broadcast: B) -> Self {
        Self {
            store,
            cache,
            broadcast,
        }
    }

    /// Validate and persist a reading, then refresh the cache and broadcast it.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Validation`] for an invalid reading, or the
    /// store's error when persistence fails. Cache and broadcast failures are
    /// logged only.
    #[tracing::instrument(skip(self, reading), fields(sensor_type = %reading.sensor_type))]
    pub async fn record(&self, reading: NewReading) -> Result<SensorReading, GreenCueError> {
        reading.validate()?;
        let saved = self.store.save(reading).await?;

        if let Err(err) = self.cache.set(saved.clone()).await {
            tracing::warn!(reading_id = %saved.id, error = %err.detail(), "failed to cache latest reading");
        }

        match serde_json::to_value(&saved) {
            Ok(payload) => {
                if let Err(err) = self.broadcast.publish(READING_CHANNEL, payload).await {
                    tracing::warn!(reading_id = %saved.id, error = %err.detail(), "failed to broadcast reading");
                }
            }
            Err(err) => tracing::warn!(reading_id = %saved.id, error = %err, "failed to encode reading"),
        }

        Ok(saved)
    }

    /// Cached latest reading of `sensor_type`, `None` when absent or when the
    /// cache is disabled or unavailable.
    pub async fn latest(&self, sensor_type: SensorType) -> Option<SensorReading> {
        match self.cache.get(sensor_type).await {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(%sensor_type, error = %err.detail(), "latest value cache unavailable");
                None
            }
        }
    }

    /// Newest stored reading of every sensor type.
    ///
    /// # Errors
    ///
    /// Returns a persistence error propagated from the store.
    pub async fn latest_per_type(&self) -> Result<Vec<SensorReading>, GreenCueError> {
        self.store.latest_per_type().await
    }

    /// Up to `limit` readings of `sensor_type`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error propagated from the store.
    pub async fn recent(
        &self,
        sensor_type: SensorType,
        limit: u32,
    ) -> Result<Vec<SensorReading>, GreenCueError> {
        self.store.recent_by_type(sensor_type, limit).await
    }

    /// Readings of `sensor_type` observed between `from` and `to` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRange`] when `from` is after `to`,
    /// or a persistence error propagated from the store.
    pub async fn in_range(
        &self,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<SensorReading>, GreenCueError> {
        if from > to {
            return Err(ValidationError::InvalidRange {
                start: from.to_rfc3339(),
                end: to.to_rfc3339(),
            }
            .into());
        }
        self.store.by_type_in_range(sensor_type, from, to).await
    }
}
