//! Condition: a sensor threshold guard such as `light < 200`.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::sensor::SensorType;

use super::parse_number;

/// Comparison applied between a reading value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Equal,
}

impl Operator {
    pub const ALL: [Self; 5] = [
        Self::LessThan,
        Self::LessOrEqual,
        Self::GreaterThan,
        Self::GreaterOrEqual,
        Self::Equal,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
        }
    }

    /// Evaluate `left <op> right` with IEEE-754 semantics.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn apply(self, left: f32, right: f32) -> bool {
        match self {
            Self::LessThan => left < right,
            Self::LessOrEqual => left <= right,
            Self::GreaterThan => left > right,
            Self::GreaterOrEqual => left >= right,
            // literal equality, no epsilon
            Self::Equal => left == right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| ParseError::UnknownOperator(s.to_string()))
    }
}

/// Threshold guard evaluated against a reading of one sensor type.
///
/// Parsed from and rendered to `"<sensor> <operator> <threshold>"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    sensor_type: SensorType,
    operator: Operator,
    threshold: f32,
}

impl Condition {
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidNumber`] when `threshold` is not finite.
    pub fn new(
        sensor_type: SensorType,
        operator: Operator,
        threshold: f32,
    ) -> Result<Self, ParseError> {
        if !threshold.is_finite() {
            return Err(ParseError::InvalidNumber(threshold.to_string()));
        }
        Ok(Self {
            sensor_type,
            operator,
            threshold,
        })
    }

    #[must_use]
    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether `value` satisfies the guard. An absent value never does.
    #[must_use]
    pub fn is_satisfied(&self, value: Option<f32>) -> bool {
        value.is_some_and(|v| self.operator.apply(v, self.threshold))
    }

    /// Whether a reading of `sensor_type` with `value` satisfies the guard.
    #[must_use]
    pub fn matches(&self, sensor_type: SensorType, value: f32) -> bool {
        self.sensor_type == sensor_type && self.is_satisfied(Some(value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.sensor_type, self.operator, self.threshold)
    }
}

impl FromStr for Condition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [sensor, operator, threshold] = tokens.as_slice() else {
            return Err(ParseError::TokenCount {
                what: "condition",
                expected: "3",
                actual: tokens.len(),
                input: s.to_string(),
            });
        };
        Self::new(
            SensorType::from_code(sensor)?,
            operator.parse()?,
            parse_number(threshold)?,
        )
    }
}
