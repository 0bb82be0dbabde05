//! Command store port: audit trail of dispatched control commands.

use std::future::Future;

use greencue_domain::control::{CommandDraft, ControlCommand, ControlTarget};
use greencue_domain::error::GreenCueError;
use greencue_domain::id::RuleId;

/// Persists and queries [`ControlCommand`]s.
pub trait CommandStore {
    /// Persist a drafted command, assigning its id and creation time.
    fn save(
        &self,
        draft: CommandDraft,
    ) -> impl Future<Output = Result<ControlCommand, GreenCueError>> + Send;

    /// Up to `limit` commands addressed to `target`, newest first.
    fn recent_by_target(
        &self,
        target: ControlTarget,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ControlCommand>, GreenCueError>> + Send;

    /// Every command produced by `rule_id`, newest first.
    fn by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<ControlCommand>, GreenCueError>> + Send;
}

impl<T: CommandStore + Send + Sync> CommandStore for std::sync::Arc<T> {
    fn save(
        &self,
        draft: CommandDraft,
    ) -> impl Future<Output = Result<ControlCommand, GreenCueError>> + Send {
        (**self).save(draft)
    }

    fn recent_by_target(
        &self,
        target: ControlTarget,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ControlCommand>, GreenCueError>> + Send {
        (**self).recent_by_target(target, limit)
    }

    fn by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<ControlCommand>, GreenCueError>> + Send {
        (**self).by_rule(rule_id)
    }
}
