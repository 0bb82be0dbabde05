//! Action: what an actuator should do once a rule fires.

use std::fmt;
use std::str::FromStr;

use crate::control::{CommandKind, ControlTarget};
use crate::error::ParseError;

use super::parse_number;

/// Target, command and optional value, e.g. `led brightness 80`.
///
/// A value is present exactly when the command kind requires one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    target: ControlTarget,
    command: CommandKind,
    value: Option<f32>,
}

impl Action {
    /// # Errors
    ///
    /// - [`ParseError::MissingValue`] when the command needs a value and none is given
    /// - [`ParseError::UnexpectedValue`] when the command takes no value and one is given
    /// - [`ParseError::InvalidNumber`] when the value is not finite
    pub fn new(
        target: ControlTarget,
        command: CommandKind,
        value: Option<f32>,
    ) -> Result<Self, ParseError> {
        match (command.requires_value(), value) {
            (true, None) => Err(ParseError::MissingValue(command)),
            (false, Some(_)) => Err(ParseError::UnexpectedValue(command)),
            (_, Some(v)) if !v.is_finite() => Err(ParseError::InvalidNumber(v.to_string())),
            _ => Ok(Self {
                target,
                command,
                value,
            }),
        }
    }

    #[must_use]
    pub fn target(&self) -> ControlTarget {
        self.target
    }

    #[must_use]
    pub fn command(&self) -> CommandKind {
        self.command
    }

    #[must_use]
    pub fn value(&self) -> Option<f32> {
        self.value
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{} {} {value}", self.target, self.command),
            None => write!(f, "{} {}", self.target, self.command),
        }
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (target, command, value) = match tokens.as_slice() {
            [target, command] => (target, command, None),
            [target, command, value] => (target, command, Some(parse_number(value)?)),
            _ => {
                return Err(ParseError::TokenCount {
                    what: "action",
                    expected: "2 or 3",
                    actual: tokens.len(),
                    input: s.to_string(),
                });
            }
        };
        Self::new(target.parse()?, command.parse()?, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_action_without_value() {
        let a: Action = "led on".parse().unwrap();
        assert_eq!(a.target(), ControlTarget::Led);
        assert_eq!(a.command(), CommandKind::On);
        assert!(a.value().is_none());
    }

    #[test]
    fn should_parse_action_with_value() {
        let a: Action = "fan speed 3".parse().unwrap();
        assert_eq!(a.command(), CommandKind::Speed);
        assert_eq!(a.value(), Some(3.0));
        assert_eq!(a.to_string(), "fan speed 3");
    }

    #[test]
    fn should_return_missing_value_when_command_requires_one() {
        assert_eq!(
            "led brightness".parse::<Action>(),
            Err(ParseError::MissingValue(CommandKind::Brightness))
        );
    }

    #[test]
    fn should_return_unexpected_value_when_command_forbids_one() {
        assert_eq!(
            "pump off 5".parse::<Action>(),
            Err(ParseError::UnexpectedValue(CommandKind::Off))
        );
    }

    #[test]
    fn should_reject_unknown_codes_and_non_numeric_value() {
        assert_eq!(
            "lamp on".parse::<Action>(),
            Err(ParseError::UnknownTarget("lamp".to_string()))
        );
        assert_eq!(
            "led blink".parse::<Action>(),
            Err(ParseError::UnknownCommand("blink".to_string()))
        );
        assert_eq!(
            "heater temperature warm".parse::<Action>(),
            Err(ParseError::InvalidNumber("warm".to_string()))
        );
    }

    #[test]
    fn should_return_token_count_error_for_single_or_four_tokens() {
        for input in ["led", "led brightness 80 now", ""] {
            assert!(matches!(
                input.parse::<Action>(),
                Err(ParseError::TokenCount { what: "action", .. })
            ));
        }
    }

    #[test]
    fn should_enforce_value_invariant_for_every_command() {
        for target in ControlTarget::ALL {
            for command in CommandKind::ALL {
                let with = Action::new(target, command, Some(1.0));
                let without = Action::new(target, command, None);
                assert_eq!(with.is_ok(), command.requires_value());
                assert_eq!(without.is_ok(), !command.requires_value());
            }
        }
    }
}
