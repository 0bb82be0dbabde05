//! Automation rules: `condition → action` pairs evaluated on every reading.
//!
//! A rule stores its [`Condition`] and [`Action`] in their canonical string
//! form. The typed views are obtained with [`AutomationRule::condition`] and
//! [`AutomationRule::action`]; both strings are validated when a rule is
//! created, but stored rows may predate that check, so callers must still
//! handle a parse failure.

mod action;
mod condition;
pub mod template;

pub use action::Action;
pub use condition::{Condition, Operator};

use serde::{Deserialize, Serialize};

use crate::error::{GreenCueError, ParseError};
use crate::id::RuleId;
use crate::time::Timestamp;

/// Persisted condition/action pair with an active flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub condition: String,
    pub action: String,
    pub active: bool,
    pub created_at: Timestamp,
}

impl AutomationRule {
    /// Parse the stored condition string.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] when the stored string is malformed.
    pub fn condition(&self) -> Result<Condition, ParseError> {
        self.condition.parse()
    }

    /// Parse the stored action string.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] when the stored string is malformed.
    pub fn action(&self) -> Result<Action, ParseError> {
        self.action.parse()
    }
}

/// A rule that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
    pub condition: String,
    pub action: String,
    pub active: bool,
}

impl NewRule {
    /// New active rule.
    #[must_use]
    pub fn new(condition: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            action: action.into(),
            active: true,
        }
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Parse both strings and replace them with their canonical rendering.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Parse`] when either string is malformed.
    pub fn normalize(self) -> Result<Self, GreenCueError> {
        let condition: Condition = self.condition.parse()?;
        let action: Action = self.action.parse()?;
        Ok(Self {
            condition: condition.to_string(),
            action: action.to_string(),
            active: self.active,
        })
    }

    /// Attach store-assigned identity and time.
    #[must_use]
    pub fn into_rule(self, id: RuleId, created_at: Timestamp) -> AutomationRule {
        AutomationRule {
            id,
            condition: self.condition,
            action: self.action,
            active: self.active,
            created_at,
        }
    }
}

/// Parse a finite decimal number token.
fn parse_number(token: &str) -> Result<f32, ParseError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{CommandKind, ControlTarget};
    use crate::sensor::SensorType;
    use crate::time::now;

    #[test]
    fn should_default_to_active_when_created() {
        let rule = NewRule::new("light < 200", "led on");
        assert!(rule.active);
        assert!(!rule.active(false).active);
    }

    #[test]
    fn should_canonicalize_strings_when_normalized() {
        let rule = NewRule::new("  LIGHT  <  200.0 ", "LED   Brightness 80")
            .normalize()
            .unwrap();
        assert_eq!(rule.condition, "light < 200");
        assert_eq!(rule.action, "led brightness 80");
    }

    #[test]
    fn should_return_parse_error_when_normalizing_malformed_action() {
        let err = NewRule::new("light < 200", "led dance").normalize().unwrap_err();
        assert!(matches!(
            err,
            GreenCueError::Parse(ParseError::UnknownCommand(cmd)) if cmd == "dance"
        ));
    }

    #[test]
    fn should_expose_typed_views_of_stored_strings() {
        let rule = NewRule::new("temp > 30", "fan on").into_rule(RuleId::new(), now());
        let condition = rule.condition().unwrap();
        let action = rule.action().unwrap();
        assert_eq!(condition.sensor_type(), SensorType::Temperature);
        assert_eq!(action.target(), ControlTarget::Fan);
        assert_eq!(action.command(), CommandKind::On);
    }

    #[test]
    fn should_reject_non_numeric_and_non_finite_tokens() {
        assert!(parse_number("12.5").is_ok());
        assert!(parse_number("-3").is_ok());
        assert!(parse_number("abc").is_err());
        assert!(parse_number("inf").is_err());
        assert!(parse_number("NaN").is_err());
    }
}
