//! Reading store port: durable storage of sensor readings.

use std::future::Future;

use greencue_domain::error::GreenCueError;
use greencue_domain::sensor::{NewReading, SensorReading, SensorType};
use greencue_domain::time::Timestamp;

/// Persists and queries [`SensorReading`]s.
pub trait ReadingStore {
    /// Persist a reading, assigning its id and observation time.
    fn save(
        &self,
        reading: NewReading,
    ) -> impl Future<Output = Result<SensorReading, GreenCueError>> + Send;

    /// Newest reading of every sensor type that has at least one.
    fn latest_per_type(
        &self,
    ) -> impl Future<Output = Result<Vec<SensorReading>, GreenCueError>> + Send;

    /// Up to `limit` readings of `sensor_type`, newest first.
    fn recent_by_type(
        &self,
        sensor_type: SensorType,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<SensorReading>, GreenCueError>> + Send;

    /// Readings of `sensor_type` observed in `[from, to]`, newest first.
    fn by_type_in_range(
        &self,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<SensorReading>, GreenCueError>> + Send;
}

impl<T: ReadingStore + Send + Sync> ReadingStore for std::sync::Arc<T> {
    fn save(
        &self,
        reading: NewReading,
    ) -> impl Future<Output = Result<SensorReading, GreenCueError>> + Send {
        (**self).save(reading)
    }

    fn latest_per_type(
        &self,
    ) -> impl Future<Output = Result<Vec<SensorReading>, GreenCueError>> + Send {
        (**self).latest_per_type()
    }

    fn recent_by_type(
        &self,
        sensor_type: SensorType,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<SensorReading>, GreenCueError>> + Send {
        (**self).recent_by_type(sensor_type, limit)
    }

    fn by_type_in_range(
        &self,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<SensorReading>, GreenCueError>> + Send {
        (**self).by_type_in_range(sensor_type, from, to)
    }
}
