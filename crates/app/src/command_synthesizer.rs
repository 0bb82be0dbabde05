//! Command synthesizer: turns a triggered rule or a manual request into a
//! [`CommandDraft`].

use greencue_domain::automation::{Action, AutomationRule};
use greencue_domain::control::{CommandDraft, CommandKind, ControlTarget};
use greencue_domain::error::{CommandSynthesisError, ParseError};

/// Draft the command a triggered rule asks for.
///
/// # Errors
///
/// Returns [`CommandSynthesisError`] wrapping the parse failure when the
/// rule's action string is malformed.
pub fn from_rule(rule: &AutomationRule) -> Result<CommandDraft, CommandSynthesisError> {
    let action = rule.action().map_err(|source| CommandSynthesisError {
        rule_id: rule.id,
        source,
    })?;
    Ok(CommandDraft::new(action, Some(rule.id)))
}

/// Draft a manually requested command. Codes are matched case-insensitively.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown codes or when `value` does not match
/// what the command requires.
pub fn from_manual(
    target: &str,
    command: &str,
    value: Option<f32>,
) -> Result<CommandDraft, ParseError> {
    let target: ControlTarget = target.trim().parse()?;
    let command: CommandKind = command.trim().parse()?;
    let action = Action::new(target, command, value)?;
    Ok(CommandDraft::new(action, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use greencue_domain::automation::NewRule;
    use greencue_domain::id::RuleId;
    use greencue_domain::time::now;

    #[test]
    fn should_link_draft_to_rule_when_synthesized_from_rule() {
        let rule = NewRule::new("light < 200", "led brightness 80").into_rule(RuleId::new(), now());
        let draft = from_rule(&rule).unwrap();
        assert_eq!(draft.rule_id(), Some(rule.id));
        assert_eq!(draft.target(), ControlTarget::Led);
        assert_eq!(draft.command(), CommandKind::Brightness);
        assert_eq!(draft.value(), Some(80.0));
    }

    #[test]
    fn should_wrap_parse_cause_when_rule_action_malformed() {
        let rule = NewRule::new("light < 200", "sprinkler on").into_rule(RuleId::new(), now());
        let err = from_rule(&rule).unwrap_err();
        assert_eq!(err.rule_id, rule.id);
        assert_eq!(err.source, ParseError::UnknownTarget("sprinkler".to_string()));
    }

    #[test]
    fn should_leave_rule_unset_for_manual_command() {
        let draft = from_manual("LED", "on", None).unwrap();
        assert!(draft.rule_id().is_none());
        assert_eq!(draft.target(), ControlTarget::Led);
    }

    #[test]
    fn should_apply_action_rules_to_manual_command() {
        assert_eq!(
            from_manual("fan", "speed", None),
            Err(ParseError::MissingValue(CommandKind::Speed))
        );
        assert_eq!(
            from_manual("fan", "on", Some(2.0)),
            Err(ParseError::UnexpectedValue(CommandKind::On))
        );
        assert_eq!(
            from_manual("door", "on", None),
            Err(ParseError::UnknownTarget("door".to_string()))
        );
    }
}
