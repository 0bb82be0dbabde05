//! Rule store port: persistence for automation rules.

use std::future::Future;

use greencue_domain::automation::{AutomationRule, NewRule};
use greencue_domain::error::GreenCueError;
use greencue_domain::id::RuleId;

/// Persists and queries [`AutomationRule`]s.
pub trait RuleStore {
    /// Persist a rule, assigning its id and creation time.
    fn save(
        &self,
        rule: NewRule,
    ) -> impl Future<Output = Result<AutomationRule, GreenCueError>> + Send;

    /// All rules whose `active` flag is set, in creation order.
    fn find_active(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, GreenCueError>> + Send;

    fn find_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, GreenCueError>> + Send;

    /// Set the `active` flag. Returns `None` when no rule has `id`.
    fn toggle_active(
        &self,
        id: RuleId,
        active: bool,
    ) -> impl Future<Output = Result<Option<AutomationRule>, GreenCueError>> + Send;
}

impl<T: RuleStore + Send + Sync> RuleStore for std::sync::Arc<T> {
    fn save(
        &self,
        rule: NewRule,
    ) -> impl Future<Output = Result<AutomationRule, GreenCueError>> + Send {
        (**self).save(rule)
    }

    fn find_active(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, GreenCueError>> + Send {
        (**self).find_active()
    }

    fn find_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, GreenCueError>> + Send {
        (**self).find_by_id(id)
    }

    fn toggle_active(
        &self,
        id: RuleId,
        active: bool,
    ) -> impl Future<Output = Result<Option<AutomationRule>, GreenCueError>> + Send {
        (**self).toggle_active(id, active)
    }
}
