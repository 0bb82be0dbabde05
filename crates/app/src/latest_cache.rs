//! In-memory latest-reading cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use greencue_domain::error::GreenCueError;
use greencue_domain::sensor::{SensorReading, SensorType};

use crate::ports::LatestValueCache;

/// Process-local [`LatestValueCache`] with atomic replace-on-write.
#[derive(Debug, Default)]
pub struct InMemoryLatestCache {
    slots: RwLock<HashMap<SensorType, SensorReading>>,
}

impl InMemoryLatestCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LatestValueCache for InMemoryLatestCache {
    async fn get(&self, sensor_type: SensorType) -> Result<Option<SensorReading>, GreenCueError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(&sensor_type).cloned())
    }

    async fn set(&self, reading: SensorReading) -> Result<(), GreenCueError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(reading.sensor_type, reading);
        Ok(())
    }
}
