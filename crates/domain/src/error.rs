//! Error taxonomy shared across the workspace.
//!
//! Every layer reports failures through [`GreenCueError`]. Domain-level
//! problems carry a typed payload ([`ParseError`], [`ValidationError`],
//! [`NotFoundError`], [`CommandSynthesisError`]); adapter failures are boxed
//! into the [`GreenCueError::Transport`] or [`GreenCueError::Persistence`]
//! variants by the adapter crates, keeping the original cause as `source()`.

use std::fmt;

use crate::control::CommandKind;
use crate::id::RuleId;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum GreenCueError {
    #[error("parse error")]
    Parse(#[from] ParseError),

    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("command synthesis failed")]
    Synthesis(#[from] CommandSynthesisError),

    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("persistence error")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("orchestration error")]
    Orchestration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GreenCueError {
    /// Discriminant exposed to callers alongside the message.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Synthesis(_) => ErrorKind::Synthesis,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Orchestration(_) => ErrorKind::Orchestration,
        }
    }

    /// Human readable detail: the wrapped cause when there is one.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Parse(err) => err.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Synthesis(err) => format!("{err}: {}", err.source),
            Self::Transport(err) | Self::Persistence(err) | Self::Orchestration(err) => {
                format!("{self}: {err}")
            }
        }
    }

    /// Wrap an unexpected failure raised while running the ingestion pipeline.
    pub fn orchestration(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Orchestration(Box::new(err))
    }
}

/// Stable classification of a [`GreenCueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Validation,
    NotFound,
    Synthesis,
    Transport,
    Persistence,
    Orchestration,
}

impl ErrorKind {
    /// Machine readable code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Parse => "PARSE_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Synthesis => "COMMAND_SYNTHESIS_ERROR",
            Self::Transport => "TRANSPORT_ERROR",
            Self::Persistence => "PERSISTENCE_ERROR",
            Self::Orchestration => "ORCHESTRATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A condition or action string could not be understood.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("{what} expects {expected} tokens, got {actual} in {input:?}")]
    TokenCount {
        what: &'static str,
        expected: &'static str,
        actual: usize,
        input: String,
    },

    #[error("unknown sensor type {0:?}")]
    UnknownSensorType(String),

    #[error("unknown operator {0:?}")]
    UnknownOperator(String),

    #[error("unknown control target {0:?}")]
    UnknownTarget(String),

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("command {0} requires a value")]
    MissingValue(CommandKind),

    #[error("command {0} does not take a value")]
    UnexpectedValue(CommandKind),
}

/// A request is missing fields or carries contradictory ones.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("unit must not be empty")]
    EmptyUnit,

    #[error("value must be a finite number")]
    NonFiniteValue,

    #[error("time range start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid identifier {0:?}")]
    InvalidId(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("no rule template matches {0:?}")]
    UnsupportedNaturalLanguage(String),
}

/// Lookup of a persisted record by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The action stored on a rule could not be turned into a command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot synthesize command for rule {rule_id}")]
pub struct CommandSynthesisError {
    pub rule_id: RuleId,
    #[source]
    pub source: ParseError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_parse_cause_as_source_when_synthesis_fails() {
        let err = CommandSynthesisError {
            rule_id: RuleId::new(),
            source: ParseError::UnknownTarget("lamp".to_string()),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "unknown control target \"lamp\"");
    }

    #[test]
    fn should_map_each_variant_to_its_kind() {
        let parse: GreenCueError = ParseError::UnknownOperator("=<".to_string()).into();
        assert_eq!(parse.kind(), ErrorKind::Parse);

        let validation: GreenCueError = ValidationError::EmptyUnit.into();
        assert_eq!(validation.kind(), ErrorKind::Validation);

        let not_found: GreenCueError = NotFoundError {
            entity: "AutomationRule",
            id: "42".to_string(),
        }
        .into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.kind().code(), "NOT_FOUND");
    }

    #[test]
    fn should_include_cause_in_detail_when_boxed() {
        let err = GreenCueError::Transport(Box::new(std::io::Error::other("broker down")));
        assert_eq!(err.detail(), "transport error: broker down");
        assert_eq!(err.kind().to_string(), "TRANSPORT_ERROR");
    }

    #[test]
    fn should_preserve_cause_when_wrapping_orchestration_failure() {
        let err = GreenCueError::orchestration(std::io::Error::other("boom"));
        assert_eq!(err.kind(), ErrorKind::Orchestration);
        assert_eq!(std::error::Error::source(&err).unwrap().to_string(), "boom");
    }
}
