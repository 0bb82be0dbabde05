//! Automation engine: matches a reading against the active rules.
//!
//! The engine holds no state of its own: every call re-reads the active rule
//! set from the [`RuleStore`], so toggles become visible on the next reading.

use greencue_domain::automation::AutomationRule;
use greencue_domain::error::GreenCueError;
use greencue_domain::sensor::SensorReading;

use crate::ports::RuleStore;

/// Finds the rules a reading triggers.
pub struct AutomationEngine<R> {
    rules: R,
}

impl<R: RuleStore> AutomationEngine<R> {
    /// Create a new engine backed by the given rule store.
    pub fn new(rules: R) -> Self {
        Self { rules }
    }

    /// Active rules whose condition is satisfied by `reading`, in store order.
    ///
    /// A rule whose stored condition cannot be parsed is logged and skipped;
    /// it never aborts evaluation of the other rules.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the active rules cannot be loaded.
    #[tracing::instrument(skip(self, reading), fields(sensor_type = %reading.sensor_type, value = reading.value))]
    pub async fn find_triggered_rules(
        &self,
        reading: &SensorReading,
    ) -> Result<Vec<AutomationRule>, GreenCueError> {
        let active = self.rules.find_active().await?;
        let triggered: Vec<_> = active
            .into_iter()
            .filter(|rule| rule.active)
            .filter(|rule| match rule.condition() {
                Ok(condition) => condition.matches(reading.sensor_type, reading.value),
                Err(err) => {
                    tracing::warn!(rule_id = %rule.id, condition = %rule.condition, error = %err, "skipping rule with malformed condition");
                    false
                }
            })
            .collect();
        tracing::debug!(count = triggered.len(), "rules triggered");
        Ok(triggered)
    }
}
