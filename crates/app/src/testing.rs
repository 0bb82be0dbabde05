//! In-memory fakes of every port.
//!
//! Compiled for this crate's unit tests and, behind the `testing` feature,
//! for the tests of the adapter crates.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use greencue_domain::automation::{AutomationRule, NewRule};
use greencue_domain::control::{CommandDraft, ControlCommand, ControlTarget};
use greencue_domain::error::GreenCueError;
use greencue_domain::id::{CommandId, ReadingId, RuleId};
use greencue_domain::sensor::{NewReading, SensorReading, SensorType};
use greencue_domain::time::{Timestamp, now};

use crate::ports::{
    BroadcastChannel, BroadcastMessage, CommandStore, DeviceTransport, InboundMessage,
    ReadingStore, RuleStore,
};

fn failure(message: &str) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::other(message.to_string()))
}

#[derive(Default)]
pub struct InMemoryReadingStore {
    pub readings: Mutex<Vec<SensorReading>>,
    pub fail: AtomicBool,
}

impl InMemoryReadingStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn len(&self) -> usize {
        self.readings.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadingStore for InMemoryReadingStore {
    async fn save(&self, reading: NewReading) -> Result<SensorReading, GreenCueError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GreenCueError::Persistence(failure("disk full")));
        }
        let saved = reading.into_reading(ReadingId::new(), now());
        self.readings.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn latest_per_type(&self) -> Result<Vec<SensorReading>, GreenCueError> {
        let readings = self.readings.lock().unwrap();
        Ok(SensorType::ALL
            .into_iter()
            .filter_map(|t| readings.iter().rev().find(|r| r.sensor_type == t).cloned())
            .collect())
    }

    async fn recent_by_type(
        &self,
        sensor_type: SensorType,
        limit: u32,
    ) -> Result<Vec<SensorReading>, GreenCueError> {
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .rev()
            .filter(|r| r.sensor_type == sensor_type)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn by_type_in_range(
        &self,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<SensorReading>, GreenCueError> {
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .rev()
            .filter(|r| r.sensor_type == sensor_type)
            .filter(|r| r.observed_at >= from && r.observed_at <= to)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRuleStore {
    pub rules: Mutex<Vec<AutomationRule>>,
}

impl InMemoryRuleStore {
    /// Insert a rule as-is, bypassing validation.
    pub fn insert(&self, condition: &str, action: &str, active: bool) -> AutomationRule {
        let rule = NewRule::new(condition, action)
            .active(active)
            .into_rule(RuleId::new(), now());
        self.rules.lock().unwrap().push(rule.clone());
        rule
    }
}

impl RuleStore for InMemoryRuleStore {
    async fn save(&self, rule: NewRule) -> Result<AutomationRule, GreenCueError> {
        let saved = rule.into_rule(RuleId::new(), now());
        self.rules.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn find_active(&self) -> Result<Vec<AutomationRule>, GreenCueError> {
        let rules = self.rules.lock().unwrap();
        Ok(rules.iter().filter(|r| r.active).cloned().collect())
    }

    async fn find_by_id(&self, id: RuleId) -> Result<Option<AutomationRule>, GreenCueError> {
        let rules = self.rules.lock().unwrap();
        Ok(rules.iter().find(|r| r.id == id).cloned())
    }

    async fn toggle_active(
        &self,
        id: RuleId,
        active: bool,
    ) -> Result<Option<AutomationRule>, GreenCueError> {
        let mut rules = self.rules.lock().unwrap();
        Ok(rules.iter_mut().find(|r| r.id == id).map(|r| {
            r.active = active;
            r.clone()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryCommandStore {
    pub commands: Mutex<Vec<ControlCommand>>,
    pub fail: AtomicBool,
}

impl InMemoryCommandStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn all(&self) -> Vec<ControlCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandStore for InMemoryCommandStore {
    async fn save(&self, draft: CommandDraft) -> Result<ControlCommand, GreenCueError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GreenCueError::Persistence(failure("database locked")));
        }
        let saved = draft.into_command(CommandId::new(), now());
        self.commands.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn recent_by_target(
        &self,
        target: ControlTarget,
        limit: u32,
    ) -> Result<Vec<ControlCommand>, GreenCueError> {
        let commands = self.commands.lock().unwrap();
        Ok(commands
            .iter()
            .rev()
            .filter(|c| c.target == target)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn by_rule(&self, rule_id: RuleId) -> Result<Vec<ControlCommand>, GreenCueError> {
        let commands = self.commands.lock().unwrap();
        Ok(commands
            .iter()
            .rev()
            .filter(|c| c.rule_id == Some(rule_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct SpyTransport {
    pub published: Mutex<Vec<(String, String)>>,
    pub subscriptions: Mutex<Vec<(String, mpsc::Sender<InboundMessage>)>>,
    pub fail: AtomicBool,
}

impl SpyTransport {
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.fail.store(true, Ordering::SeqCst);
        transport
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn subscribed_topics(&self) -> Vec<String> {
        let subs = self.subscriptions.lock().unwrap();
        subs.iter().map(|(topic, _)| topic.clone()).collect()
    }

    /// Sender feeding the subscription registered for `topic`.
    pub fn sender(&self, topic: &str) -> mpsc::Sender<InboundMessage> {
        let subs = self.subscriptions.lock().unwrap();
        subs.iter()
            .find(|(t, _)| t == topic)
            .map(|(_, tx)| tx.clone())
            .unwrap()
    }
}

impl DeviceTransport for SpyTransport {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), GreenCueError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GreenCueError::Transport(failure("broker unreachable")));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload));
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<mpsc::Receiver<InboundMessage>, GreenCueError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GreenCueError::Transport(failure("broker unreachable")));
        }
        let (tx, rx) = mpsc::channel(16);
        self.subscriptions
            .lock()
            .unwrap()
            .push((topic.to_string(), tx));
        Ok(rx)
    }
}

#[derive(Default)]
pub struct SpyBroadcast {
    pub messages: Mutex<Vec<BroadcastMessage>>,
}

impl SpyBroadcast {
    pub fn on(&self, channel: &str) -> Vec<serde_json::Value> {
        let messages = self.messages.lock().unwrap();
        messages
            .iter()
            .filter(|m| m.channel == channel)
            .map(|m| m.payload.clone())
            .collect()
    }
}

impl BroadcastChannel for SpyBroadcast {
    async fn publish(
        &self,
        channel: &str,
        payload: serde_json::Value,
    ) -> Result<(), GreenCueError> {
        self.messages.lock().unwrap().push(BroadcastMessage {
            channel: channel.to_string(),
            payload,
        });
        Ok(())
    }
}
