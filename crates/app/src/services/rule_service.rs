//! Rule service: use-cases for managing automation rules.

use greencue_domain::automation::{AutomationRule, NewRule, template};
use greencue_domain::error::{GreenCueError, NotFoundError};
use greencue_domain::id::RuleId;

use crate::ports::RuleStore;

/// Application service for automation rules.
pub struct RuleService<R> {
    store: R,
}

impl<R: RuleStore> RuleService<R> {
    /// Create a new service backed by the given rule store.
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Validate both strings and persist the rule in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Parse`] when the condition or action is
    /// malformed, or a persistence error from the store.
    #[tracing::instrument(skip(self, rule), fields(condition = %rule.condition, action = %rule.action))]
    pub async fn create_rule(&self, rule: NewRule) -> Result<AutomationRule, GreenCueError> {
        let rule = rule.normalize()?;
        let saved = self.store.save(rule).await?;
        tracing::info!(rule_id = %saved.id, "rule created");
        Ok(saved)
    }

    /// Create a rule from one of the fixed natural-language templates.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Validation`] when `text` matches no template,
    /// or a persistence error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn create_rule_from_natural_language(
        &self,
        text: &str,
    ) -> Result<AutomationRule, GreenCueError> {
        let rule = template::translate(text)?;
        self.create_rule(rule).await
    }

    /// Set the active flag of a rule.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::NotFound`] when no rule has `id`, or a
    /// persistence error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_rule(
        &self,
        id: RuleId,
        active: bool,
    ) -> Result<AutomationRule, GreenCueError> {
        self.store
            .toggle_active(id, active)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Look up a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::NotFound`] when no rule has `id`, or a
    /// persistence error from the store.
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, GreenCueError> {
        self.store.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// All active rules.
    ///
    /// # Errors
    ///
    /// Returns a persistence error propagated from the store.
    pub async fn list_active_rules(&self) -> Result<Vec<AutomationRule>, GreenCueError> {
        self.store.find_active().await
    }

    /// Sample phrases for the natural-language endpoint.
    #[must_use]
    pub fn examples(&self) -> &'static [&'static str] {
        &template::EXAMPLES
    }
}

fn not_found(id: RuleId) -> GreenCueError {
    NotFoundError {
        entity: "AutomationRule",
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use greencue_domain::error::{ErrorKind, ParseError, ValidationError};

    use crate::testing::InMemoryRuleStore;

    fn service() -> (Arc<InMemoryRuleStore>, RuleService<Arc<InMemoryRuleStore>>) {
        let store = Arc::new(InMemoryRuleStore::default());
        (Arc::clone(&store), RuleService::new(store))
    }

    #[tokio::test]
    async fn should_store_canonical_strings_when_creating_rule() {
        let (_, service) = service();

        let rule = service
            .create_rule(NewRule::new("TEMP  >  30.0", "Fan ON"))
            .await
            .unwrap();

        assert_eq!(rule.condition, "temp > 30");
        assert_eq!(rule.action, "fan on");
        assert!(rule.active);
    }

    #[tokio::test]
    async fn should_reject_malformed_rule_without_storing_it() {
        let (store, service) = service();

        let err = service
            .create_rule(NewRule::new("light ~ 200", "led on"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GreenCueError::Parse(ParseError::UnknownOperator(_))
        ));
        assert!(store.rules.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_toggle_rule_and_hide_it_from_active_list() {
        let (_, service) = service();
        let rule = service
            .create_rule(NewRule::new("light < 200", "led on"))
            .await
            .unwrap();

        let toggled = service.toggle_rule(rule.id, false).await.unwrap();

        assert!(!toggled.active);
        assert!(service.list_active_rules().await.unwrap().is_empty());
        assert!(!service.get_rule(rule.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_rule() {
        let (_, service) = service();

        let toggle = service.toggle_rule(RuleId::new(), true).await.unwrap_err();
        let get = service.get_rule(RuleId::new()).await.unwrap_err();

        assert_eq!(toggle.kind(), ErrorKind::NotFound);
        assert_eq!(get.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn should_create_fixed_rule_from_natural_language() {
        let (_, service) = service();

        let rule = service
            .create_rule_from_natural_language("조도가 200 lux 이하일 때 LED 켜줘")
            .await
            .unwrap();

        assert_eq!(rule.condition, "light < 200");
        assert_eq!(rule.action, "led on");
    }

    #[tokio::test]
    async fn should_reject_unsupported_natural_language() {
        let (store, service) = service();

        let err = service
            .create_rule_from_natural_language("습도가 40% 이하로 떨어지면 알림 보내줘")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GreenCueError::Validation(ValidationError::UnsupportedNaturalLanguage(_))
        ));
        assert!(store.rules.lock().unwrap().is_empty());
    }
}
