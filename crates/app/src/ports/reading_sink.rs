//! Reading sink port: the entry point inbound telemetry is fed into.

use std::future::Future;

use greencue_domain::error::GreenCueError;
use greencue_domain::sensor::{NewReading, SensorReading};

/// Accepts validated readings for ingestion.
pub trait ReadingSink {
    fn ingest(
        &self,
        reading: NewReading,
    ) -> impl Future<Output = Result<SensorReading, GreenCueError>> + Send;
}

impl<T: ReadingSink + Send + Sync> ReadingSink for std::sync::Arc<T> {
    fn ingest(
        &self,
        reading: NewReading,
    ) -> impl Future<Output = Result<SensorReading, GreenCueError>> + Send {
        (**self).ingest(reading)
    }
}
