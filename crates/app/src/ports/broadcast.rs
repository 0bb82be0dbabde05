//! Broadcast port: realtime fan-out to observing clients.

use std::future::Future;

use serde::Serialize;

use greencue_domain::error::GreenCueError;

/// Channel carrying every persisted sensor reading.
pub const READING_CHANNEL: &str = "/topic/sensor-data";

/// Channel carrying every persisted control command.
pub const COMMAND_CHANNEL: &str = "/topic/control-command";

/// One message on a named broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastMessage {
    pub channel: String,
    pub payload: serde_json::Value,
}

/// Pushes messages to realtime observers. Distinct from actuation.
pub trait BroadcastChannel {
    fn publish(
        &self,
        channel: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send;
}

impl<T: BroadcastChannel + Send + Sync> BroadcastChannel for std::sync::Arc<T> {
    fn publish(
        &self,
        channel: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send {
        (**self).publish(channel, payload)
    }
}
