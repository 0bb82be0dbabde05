//! Actuator targets, command kinds and dispatched control commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::automation::Action;
use crate::error::ParseError;
use crate::id::{CommandId, RuleId};
use crate::time::Timestamp;

/// Payload published when a command carries no value.
pub const NO_VALUE_PAYLOAD: &str = "1";

/// Actuator category a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTarget {
    Led,
    Fan,
    Pump,
    Heater,
}

impl ControlTarget {
    pub const ALL: [Self; 4] = [Self::Led, Self::Fan, Self::Pump, Self::Heater];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Led => "led",
            Self::Fan => "fan",
            Self::Pump => "pump",
            Self::Heater => "heater",
        }
    }
}

impl fmt::Display for ControlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ControlTarget {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownTarget(s.to_string()))
    }
}

/// What the actuator is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    On,
    Off,
    Brightness,
    Speed,
    Temperature,
}

impl CommandKind {
    pub const ALL: [Self; 5] = [
        Self::On,
        Self::Off,
        Self::Brightness,
        Self::Speed,
        Self::Temperature,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Brightness => "brightness",
            Self::Speed => "speed",
            Self::Temperature => "temperature",
        }
    }

    /// Whether a numeric value must accompany this command.
    #[must_use]
    pub fn requires_value(self) -> bool {
        matches!(self, Self::Brightness | Self::Speed | Self::Temperature)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CommandKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownCommand(s.to_string()))
    }
}

/// A command that has been synthesized but not yet persisted.
///
/// Only constructible from a validated [`Action`], so the value always
/// matches what the command kind requires.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDraft {
    action: Action,
    rule_id: Option<RuleId>,
}

impl CommandDraft {
    #[must_use]
    pub fn new(action: Action, rule_id: Option<RuleId>) -> Self {
        Self { action, rule_id }
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[must_use]
    pub fn target(&self) -> ControlTarget {
        self.action.target()
    }

    #[must_use]
    pub fn command(&self) -> CommandKind {
        self.action.command()
    }

    #[must_use]
    pub fn value(&self) -> Option<f32> {
        self.action.value()
    }

    #[must_use]
    pub fn rule_id(&self) -> Option<RuleId> {
        self.rule_id
    }

    /// Attach store-assigned identity and time.
    #[must_use]
    pub fn into_command(self, id: CommandId, created_at: Timestamp) -> ControlCommand {
        ControlCommand {
            id,
            target: self.action.target(),
            command: self.action.command(),
            value: self.action.value(),
            rule_id: self.rule_id,
            created_at,
        }
    }
}

/// A persisted actuator instruction.
///
/// `rule_id` is a non-owning back-reference to the rule that produced the
/// command; deleting the rule never removes the command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub id: CommandId,
    pub target: ControlTarget,
    pub command: CommandKind,
    pub value: Option<f32>,
    pub rule_id: Option<RuleId>,
    pub created_at: Timestamp,
}

impl ControlCommand {
    /// Device transport topic: `<namespace>/control/<target>/<command>`.
    #[must_use]
    pub fn topic(&self, namespace: &str) -> String {
        control_topic(namespace, self.target, self.command)
    }

    /// Device transport payload: the value, or [`NO_VALUE_PAYLOAD`].
    #[must_use]
    pub fn payload(&self) -> String {
        self.value
            .map_or_else(|| NO_VALUE_PAYLOAD.to_string(), |v| v.to_string())
    }
}

#[must_use]
pub fn control_topic(namespace: &str, target: ControlTarget, command: CommandKind) -> String {
    format!("{namespace}/control/{}/{}", target.code(), command.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn command(action: &str) -> ControlCommand {
        let action: Action = action.parse().unwrap();
        CommandDraft::new(action, None).into_command(CommandId::new(), now())
    }

    #[test]
    fn should_use_sentinel_payload_when_no_value() {
        let cmd = command("led on");
        assert_eq!(cmd.topic("smartfarm"), "smartfarm/control/led/on");
        assert_eq!(cmd.payload(), "1");
    }

    #[test]
    fn should_render_value_as_decimal_payload() {
        assert_eq!(command("led brightness 80").payload(), "80");
        assert_eq!(command("heater temperature 21.5").payload(), "21.5");
        assert_eq!(
            command("fan speed 3").topic("farm-a"),
            "farm-a/control/fan/speed"
        );
    }

    #[test]
    fn should_only_require_value_for_set_point_commands() {
        let required: Vec<_> = CommandKind::ALL
            .into_iter()
            .filter(|c| c.requires_value())
            .collect();
        assert_eq!(
            required,
            vec![
                CommandKind::Brightness,
                CommandKind::Speed,
                CommandKind::Temperature
            ]
        );
    }

    #[test]
    fn should_parse_codes_case_insensitively() {
        assert_eq!("HEATER".parse::<ControlTarget>().unwrap(), ControlTarget::Heater);
        assert_eq!("Off".parse::<CommandKind>().unwrap(), CommandKind::Off);
        assert_eq!(
            "lamp".parse::<ControlTarget>(),
            Err(ParseError::UnknownTarget("lamp".to_string()))
        );
    }

    #[test]
    fn should_keep_rule_back_reference_when_persisted() {
        let rule_id = RuleId::new();
        let draft = CommandDraft::new("pump on".parse().unwrap(), Some(rule_id));
        let cmd = draft.into_command(CommandId::new(), now());
        assert_eq!(cmd.rule_id, Some(rule_id));
        assert_eq!(cmd.target, ControlTarget::Pump);
        assert!(cmd.value.is_none());
    }
}
