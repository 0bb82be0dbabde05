//! Latest value cache port: one slot per sensor type.

use std::future::Future;

use greencue_domain::error::GreenCueError;
use greencue_domain::sensor::{SensorReading, SensorType};

/// Single-slot cache of the most recent reading per sensor type.
///
/// Writes replace the slot; readers observe some prior or the current write.
/// A miss is `Ok(None)`, never an error.
pub trait LatestValueCache {
    fn get(
        &self,
        sensor_type: SensorType,
    ) -> impl Future<Output = Result<Option<SensorReading>, GreenCueError>> + Send;

    fn set(
        &self,
        reading: SensorReading,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send;
}

impl<T: LatestValueCache + Send + Sync> LatestValueCache for std::sync::Arc<T> {
    fn get(
        &self,
        sensor_type: SensorType,
    ) -> impl Future<Output = Result<Option<SensorReading>, GreenCueError>> + Send {
        (**self).get(sensor_type)
    }

    fn set(
        &self,
        reading: SensorReading,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send {
        (**self).set(reading)
    }
}

/// A disabled cache (`None`) always misses and accepts writes silently.
impl<T: LatestValueCache + Send + Sync> LatestValueCache for Option<T> {
    async fn get(&self, sensor_type: SensorType) -> Result<Option<SensorReading>, GreenCueError> {
        match self {
            Some(cache) => cache.get(sensor_type).await,
            None => Ok(None),
        }
    }

    async fn set(&self, reading: SensorReading) -> Result<(), GreenCueError> {
        match self {
            Some(cache) => cache.set(reading).await,
            None => Ok(()),
        }
    }
}
