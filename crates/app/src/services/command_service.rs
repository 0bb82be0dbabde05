//! Command service: manual control and command history.

use std::sync::Arc;

use greencue_domain::control::{ControlCommand, ControlTarget};
use greencue_domain::error::GreenCueError;
use greencue_domain::id::RuleId;

use crate::command_dispatcher::CommandDispatcher;
use crate::command_synthesizer;
use crate::ports::{BroadcastChannel, CommandStore, DeviceTransport};

/// Application service for control commands.
pub struct CommandService<S, T, B> {
    store: S,
    dispatcher: Arc<CommandDispatcher<S, T, B>>,
}

impl<S, T, B> CommandService<S, T, B>
where
    S: CommandStore,
    T: DeviceTransport,
    B: BroadcastChannel,
{
    pub fn new(store: S, dispatcher: Arc<CommandDispatcher<S, T, B>>) -> Self {
        Self { store, dispatcher }
    }

    /// Synthesize and dispatch a command requested by an operator.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Parse`] for unknown codes or a value that does
    /// not match the command, or a persistence error when the command cannot
    /// be stored. A failed publish is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn execute_manual_command(
        &self,
        target: &str,
        command: &str,
        value: Option<f32>,
    ) -> Result<ControlCommand, GreenCueError> {
        let draft = command_synthesizer::from_manual(target, command, value)?;
        self.dispatcher.execute(draft).await
    }

    /// Up to `limit` commands sent to `target`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error propagated from the store.
    pub async fn list_recent_commands(
        &self,
        target: ControlTarget,
        limit: u32,
    ) -> Result<Vec<ControlCommand>, GreenCueError> {
        self.store.recent_by_target(target, limit).await
    }

    /// Commands produced by `rule_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error propagated from the store.
    pub async fn list_commands_by_rule(
        &self,
        rule_id: RuleId,
    ) -> Result<Vec<ControlCommand>, GreenCueError> {
        self.store.by_rule(rule_id).await
    }
}
