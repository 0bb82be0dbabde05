//! Sensor ingestion: records a reading, then runs it through the rules.

use std::sync::Arc;

use greencue_domain::error::GreenCueError;
use greencue_domain::sensor::{NewReading, SensorReading};

use crate::orchestrator::Orchestrator;
use crate::ports::{
    BroadcastChannel, CommandStore, DeviceTransport, LatestValueCache, ReadingSink, ReadingStore,
    RuleStore,
};
use crate::services::reading_service::ReadingService;

/// Entry point for every new reading, whether it arrives over HTTP or from
/// the telemetry bridge.
pub struct SensorIngestion<RS, C, B, R, S, T> {
    readings: Arc<ReadingService<RS, C, B>>,
    orchestrator: Arc<Orchestrator<R, S, T, B>>,
}

impl<RS, C, B, R, S, T> SensorIngestion<RS, C, B, R, S, T>
where
    RS: ReadingStore + Send + Sync,
    C: LatestValueCache + Send + Sync,
    B: BroadcastChannel + Send + Sync,
    R: RuleStore + Send + Sync,
    S: CommandStore + Send + Sync,
    T: DeviceTransport + Send + Sync,
{
    pub fn new(
        readings: Arc<ReadingService<RS, C, B>>,
        orchestrator: Arc<Orchestrator<R, S, T, B>>,
    ) -> Self {
        Self {
            readings,
            orchestrator,
        }
    }

    /// Persist, cache and broadcast `reading`, then evaluate the rules.
    ///
    /// Rule evaluation failures are logged and never fail the ingestion.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Validation`] for an invalid reading, or the
    /// store's error when the reading cannot be persisted.
    #[tracing::instrument(skip(self, reading), fields(sensor_type = %reading.sensor_type, value = reading.value))]
    pub async fn submit_reading(
        &self,
        reading: NewReading,
    ) -> Result<SensorReading, GreenCueError> {
        let saved = self.readings.record(reading).await?;

        match self.orchestrator.process_reading(&saved).await {
            Ok(report) => tracing::debug!(
                reading_id = %saved.id,
                triggered = report.triggered.len(),
                dispatched = report.dispatched.len(),
                failed = report.failures.len(),
                "reading processed"
            ),
            Err(err) => {
                let err = GreenCueError::orchestration(err);
                tracing::error!(reading_id = %saved.id, error = %err.detail(), "rule evaluation aborted");
            }
        }

        Ok(saved)
    }
}

impl<RS, C, B, R, S, T> ReadingSink for SensorIngestion<RS, C, B, R, S, T>
where
    RS: ReadingStore + Send + Sync,
    C: LatestValueCache + Send + Sync,
    B: BroadcastChannel + Send + Sync,
    R: RuleStore + Send + Sync,
    S: CommandStore + Send + Sync,
    T: DeviceTransport + Send + Sync,
{
    async fn ingest(&self, reading: NewReading) -> Result<SensorReading, GreenCueError> {
        self.submit_reading(reading).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use greencue_domain::control::ControlTarget;
    use greencue_domain::error::ErrorKind;
    use greencue_domain::sensor::SensorType;

    use crate::automation_engine::AutomationEngine;
    use crate::command_dispatcher::CommandDispatcher;
    use crate::latest_cache::InMemoryLatestCache;
    use crate::ports::{COMMAND_CHANNEL, READING_CHANNEL};
    use crate::testing::{
        InMemoryCommandStore, InMemoryReadingStore, InMemoryRuleStore, SpyBroadcast, SpyTransport,
    };

    struct Harness {
        readings: Arc<InMemoryReadingStore>,
        rules: Arc<InMemoryRuleStore>,
        commands: Arc<InMemoryCommandStore>,
        transport: Arc<SpyTransport>,
        broadcast: Arc<SpyBroadcast>,
    }

    type TestIngestion = SensorIngestion<
        Arc<InMemoryReadingStore>,
        Option<InMemoryLatestCache>,
        Arc<SpyBroadcast>,
        Arc<InMemoryRuleStore>,
        Arc<InMemoryCommandStore>,
        Arc<SpyTransport>,
    >;

    impl Harness {
        fn new(readings: InMemoryReadingStore) -> Self {
            Self {
                readings: Arc::new(readings),
                rules: Arc::new(InMemoryRuleStore::default()),
                commands: Arc::new(InMemoryCommandStore::default()),
                transport: Arc::new(SpyTransport::default()),
                broadcast: Arc::new(SpyBroadcast::default()),
            }
        }

        fn ingestion(&self) -> TestIngestion {
            let readings = ReadingService::new(
                Arc::clone(&self.readings),
                Some(InMemoryLatestCache::new()),
                Arc::clone(&self.broadcast),
            );
            let dispatcher = CommandDispatcher::new(
                Arc::clone(&self.commands),
                Arc::clone(&self.transport),
                Arc::clone(&self.broadcast),
            );
            let orchestrator = Orchestrator::new(
                AutomationEngine::new(Arc::clone(&self.rules)),
                Arc::new(dispatcher),
            );
            SensorIngestion::new(Arc::new(readings), Arc::new(orchestrator))
        }
    }

    fn reading(sensor_type: SensorType, value: f32, unit: &str) -> NewReading {
        NewReading::builder()
            .sensor_type(sensor_type)
            .value(value)
            .unit(unit)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_dispatch_led_on_when_light_below_threshold() {
        let h = Harness::new(InMemoryReadingStore::default());
        let rule = h.rules.insert("light < 200", "led on", true);

        h.ingestion()
            .ingest(reading(SensorType::Light, 150.0, "lux"))
            .await
            .unwrap();

        let commands = h.commands.all();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].target, ControlTarget::Led);
        assert!(commands[0].value.is_none());
        assert_eq!(commands[0].rule_id, Some(rule.id));
        assert_eq!(
            h.transport.published(),
            vec![("smartfarm/control/led/on".to_string(), "1".to_string())]
        );
        assert_eq!(h.broadcast.on(READING_CHANNEL).len(), 1);
        assert_eq!(h.broadcast.on(COMMAND_CHANNEL).len(), 1);
    }

    #[tokio::test]
    async fn should_skip_inactive_rule_when_temperature_high() {
        let h = Harness::new(InMemoryReadingStore::default());
        h.rules.insert("temp > 30", "fan on", true);
        h.rules.insert("temp > 40", "heater on", false);

        h.ingestion()
            .ingest(reading(SensorType::Temperature, 32.0, "℃"))
            .await
            .unwrap();

        let targets: Vec<_> = h.commands.all().iter().map(|c| c.target).collect();
        assert_eq!(targets, vec![ControlTarget::Fan]);
    }

    #[tokio::test]
    async fn should_succeed_when_every_triggered_rule_fails() {
        let h = Harness::new(InMemoryReadingStore::default());
        h.rules.insert("light < 200", "led glow", true);

        let saved = h
            .ingestion()
            .ingest(reading(SensorType::Light, 10.0, "lux"))
            .await
            .unwrap();

        assert_eq!(saved.value, 10.0);
        assert!(h.commands.all().is_empty());
    }

    #[tokio::test]
    async fn should_fail_and_skip_rules_when_reading_not_persisted() {
        let h = Harness::new(InMemoryReadingStore::failing());
        h.rules.insert("light < 200", "led on", true);

        let err = h
            .ingestion()
            .ingest(reading(SensorType::Light, 10.0, "lux"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(h.commands.all().is_empty());
        assert!(h.transport.published().is_empty());
    }
}
