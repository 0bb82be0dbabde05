//! Command dispatcher: persists, publishes and broadcasts control commands.
//!
//! Persistence is the durable step and must succeed. Publishing to the device
//! transport and broadcasting to observers are best-effort: a failure there is
//! logged and the persisted command is still returned.

use greencue_domain::control::{CommandDraft, ControlCommand};
use greencue_domain::error::GreenCueError;

use crate::ports::{BroadcastChannel, COMMAND_CHANNEL, CommandStore, DeviceTransport};

/// Default topic namespace for device control.
pub const DEFAULT_NAMESPACE: &str = "smartfarm";

/// Executes drafted commands against the store, transport and broadcast ports.
pub struct CommandDispatcher<S, T, B> {
    store: S,
    transport: T,
    broadcast: B,
    namespace: String,
}

impl<S, T, B> CommandDispatcher<S, T, B>
where
    S: CommandStore,
    T: DeviceTransport,
    B: BroadcastChannel,
{
    pub fn new(store: S, transport: T, broadcast: B) -> Self {
        Self {
            store,
            transport,
            broadcast,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Override the topic namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Persist `draft`, publish it to the actuator, and broadcast it.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the command cannot be persisted.
    /// Publish and broadcast failures are logged, not returned.
    #[tracing::instrument(skip(self, draft), fields(target = %draft.target(), command = %draft.command()))]
    pub async fn execute(&self, draft: CommandDraft) -> Result<ControlCommand, GreenCueError> {
        let command = self.store.save(draft).await?;

        let topic = command.topic(&self.namespace);
        let payload = command.payload();
        match self.transport.publish(&topic, payload).await {
            Ok(()) => tracing::debug!(%topic, command_id = %command.id, "command published"),
            Err(err) => tracing::warn!(
                %topic,
                command_id = %command.id,
                error = %err.detail(),
                "command persisted but not delivered, running degraded"
            ),
        }

        match serde_json::to_value(&command) {
            Ok(payload) => {
                if let Err(err) = self.broadcast.publish(COMMAND_CHANNEL, payload).await {
                    tracing::warn!(command_id = %command.id, error = %err.detail(), "failed to broadcast command");
                }
            }
            Err(err) => tracing::warn!(command_id = %command.id, error = %err, "failed to encode command"),
        }

        Ok(command)
    }
}
