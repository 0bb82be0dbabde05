//! Reading → rule → command orchestration.
//!
//! Every triggered rule is synthesized and dispatched independently. A
//! failure for one rule is logged with the rule id and recorded in the
//! [`OrchestrationReport`]; the remaining rules still run. Nothing is rolled
//! back or retried here.

use std::sync::Arc;

use greencue_domain::control::ControlCommand;
use greencue_domain::error::GreenCueError;
use greencue_domain::id::RuleId;
use greencue_domain::sensor::SensorReading;

use crate::automation_engine::AutomationEngine;
use crate::command_dispatcher::CommandDispatcher;
use crate::command_synthesizer;
use crate::ports::{BroadcastChannel, CommandStore, DeviceTransport, RuleStore};

/// Outcome of running one reading through the rule pipeline.
#[derive(Debug, Default)]
pub struct OrchestrationReport {
    pub triggered: Vec<RuleId>,
    pub dispatched: Vec<ControlCommand>,
    pub failures: Vec<RuleFailure>,
}

/// A triggered rule that did not produce a persisted command.
#[derive(Debug)]
pub struct RuleFailure {
    pub rule_id: RuleId,
    pub error: GreenCueError,
}

/// Drives the [`AutomationEngine`] and the [`CommandDispatcher`].
pub struct Orchestrator<R, S, T, B> {
    engine: AutomationEngine<R>,
    dispatcher: Arc<CommandDispatcher<S, T, B>>,
}

impl<R, S, T, B> Orchestrator<R, S, T, B>
where
    R: RuleStore,
    S: CommandStore,
    T: DeviceTransport,
    B: BroadcastChannel,
{
    pub fn new(engine: AutomationEngine<R>, dispatcher: Arc<CommandDispatcher<S, T, B>>) -> Self {
        Self { engine, dispatcher }
    }

    /// Evaluate `reading` and dispatch one command per triggered rule.
    ///
    /// # Errors
    ///
    /// Returns an error only when the active rules cannot be loaded;
    /// per-rule failures are reported in [`OrchestrationReport::failures`].
    #[tracing::instrument(skip(self, reading), fields(reading_id = %reading.id))]
    pub async fn process_reading(
        &self,
        reading: &SensorReading,
    ) -> Result<OrchestrationReport, GreenCueError> {
        let rules = self.engine.find_triggered_rules(reading).await?;
        let mut report = OrchestrationReport::default();

        for rule in rules {
            report.triggered.push(rule.id);
            let outcome = match command_synthesizer::from_rule(&rule) {
                Ok(draft) => self.dispatcher.execute(draft).await,
                Err(err) => Err(err.into()),
            };
            match outcome {
                Ok(command) => {
                    tracing::info!(rule_id = %rule.id, command_id = %command.id, "rule executed");
                    report.dispatched.push(command);
                }
                Err(error) => {
                    tracing::warn!(rule_id = %rule.id, kind = %error.kind(), error = %error.detail(), "rule execution failed");
                    report.failures.push(RuleFailure {
                        rule_id: rule.id,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use greencue_domain::control::{CommandKind, ControlTarget};
    use greencue_domain::error::ErrorKind;
    use greencue_domain::id::ReadingId;
    use greencue_domain::sensor::SensorType;
    use greencue_domain::time::now;

    use crate::testing::{InMemoryCommandStore, InMemoryRuleStore, SpyBroadcast, SpyTransport};

    type TestOrchestrator = Orchestrator<
        Arc<InMemoryRuleStore>,
        Arc<InMemoryCommandStore>,
        Arc<SpyTransport>,
        Arc<SpyBroadcast>,
    >;

    fn orchestrator(
        rules: &Arc<InMemoryRuleStore>,
        commands: &Arc<InMemoryCommandStore>,
        transport: &Arc<SpyTransport>,
    ) -> TestOrchestrator {
        let dispatcher = CommandDispatcher::new(
            Arc::clone(commands),
            Arc::clone(transport),
            Arc::new(SpyBroadcast::default()),
        );
        Orchestrator::new(
            AutomationEngine::new(Arc::clone(rules)),
            Arc::new(dispatcher),
        )
    }

    fn reading(sensor_type: SensorType, value: f32) -> SensorReading {
        SensorReading {
            id: ReadingId::new(),
            sensor_type,
            value,
            unit: sensor_type.default_unit().to_string(),
            device_id: None,
            observed_at: now(),
        }
    }

    #[tokio::test]
    async fn should_isolate_rule_with_malformed_action() {
        let rules = Arc::new(InMemoryRuleStore::default());
        let commands = Arc::new(InMemoryCommandStore::default());
        let transport = Arc::new(SpyTransport::default());
        rules.insert("humi < 40", "pump on", true);
        let broken = rules.insert("humi < 50", "pump spray", true);
        rules.insert("humi < 60", "fan off", true);
        rules.insert("humi <= 35", "led brightness 10", true);

        let report = orchestrator(&rules, &commands, &transport)
            .process_reading(&reading(SensorType::Humidity, 35.0))
            .await
            .unwrap();

        assert_eq!(report.triggered.len(), 4);
        assert_eq!(report.dispatched.len(), 3);
        assert_eq!(commands.all().len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].rule_id, broken.id);
        assert_eq!(report.failures[0].error.kind(), ErrorKind::Synthesis);
    }

    #[tokio::test]
    async fn should_continue_after_persistence_failure_for_one_rule() {
        let rules = Arc::new(InMemoryRuleStore::default());
        let commands = Arc::new(InMemoryCommandStore::failing());
        let transport = Arc::new(SpyTransport::default());
        rules.insert("light < 200", "led on", true);
        rules.insert("light < 300", "fan on", true);

        let report = orchestrator(&rules, &commands, &transport)
            .process_reading(&reading(SensorType::Light, 100.0))
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 2);
        assert!(
            report
                .failures
                .iter()
                .all(|f| f.error.kind() == ErrorKind::Persistence)
        );
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_only_active_triggered_rules() {
        let rules = Arc::new(InMemoryRuleStore::default());
        let commands = Arc::new(InMemoryCommandStore::default());
        let transport = Arc::new(SpyTransport::default());
        let fan = rules.insert("temp > 30", "fan on", true);
        rules.insert("temp > 40", "heater on", false);

        let report = orchestrator(&rules, &commands, &transport)
            .process_reading(&reading(SensorType::Temperature, 32.0))
            .await
            .unwrap();

        assert_eq!(report.triggered, vec![fan.id]);
        let stored = commands.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].target, ControlTarget::Fan);
        assert_eq!(stored[0].command, CommandKind::On);
        assert_eq!(stored[0].rule_id, Some(fan.id));
        assert_eq!(
            transport.published(),
            vec![("smartfarm/control/fan/on".to_string(), "1".to_string())]
        );
    }

    #[tokio::test]
    async fn should_issue_independent_commands_for_repeated_readings() {
        let rules = Arc::new(InMemoryRuleStore::default());
        let commands = Arc::new(InMemoryCommandStore::default());
        let transport = Arc::new(SpyTransport::default());
        rules.insert("light < 200", "led on", true);
        let orchestrator = orchestrator(&rules, &commands, &transport);

        let dark = reading(SensorType::Light, 120.0);
        orchestrator.process_reading(&dark).await.unwrap();
        orchestrator.process_reading(&dark).await.unwrap();

        assert_eq!(commands.all().len(), 2);
        assert_eq!(transport.published().len(), 2);
    }
}
