//! Sensor readings and the sensor types the gateway understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GreenCueError, ParseError, ValidationError};
use crate::id::ReadingId;
use crate::time::Timestamp;

/// Kind of physical quantity a sensor measures.
///
/// Internally a sensor type is addressed by its short code (`light`, `temp`,
/// `humi`), which is what condition strings and the API use. Devices publish
/// under a longer transport name (`light`, `temperature`, `humidity`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "temp")]
    Temperature,
    #[serde(rename = "humi")]
    Humidity,
}

impl SensorType {
    pub const ALL: [Self; 3] = [Self::Light, Self::Temperature, Self::Humidity];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Temperature => "temp",
            Self::Humidity => "humi",
        }
    }

    /// Name used on the device transport topics.
    #[must_use]
    pub fn transport_name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }

    #[must_use]
    pub fn default_unit(self) -> &'static str {
        match self {
            Self::Light => "lux",
            Self::Temperature => "℃",
            Self::Humidity => "%RH",
        }
    }

    /// Case-insensitive lookup by internal code.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownSensorType`] for any other input.
    pub fn from_code(code: &str) -> Result<Self, ParseError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ParseError::UnknownSensorType(code.to_string()))
    }

    /// Case-insensitive lookup by transport name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownSensorType`] for any other input.
    pub fn from_transport_name(name: &str) -> Result<Self, ParseError> {
        Self::ALL
            .into_iter()
            .find(|t| t.transport_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseError::UnknownSensorType(name.to_string()))
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SensorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// One timestamped sensor observation, as persisted by the reading store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: ReadingId,
    pub sensor_type: SensorType,
    pub value: f32,
    pub unit: String,
    pub device_id: Option<String>,
    pub observed_at: Timestamp,
}

/// A reading that has been validated but not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub sensor_type: SensorType,
    pub value: f32,
    pub unit: String,
    pub device_id: Option<String>,
}

impl NewReading {
    /// Create a builder for constructing a [`NewReading`].
    #[must_use]
    pub fn builder() -> NewReadingBuilder {
        NewReadingBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GreenCueError::Validation`] when:
    /// - `unit` is blank ([`ValidationError::EmptyUnit`])
    /// - `value` is `NaN` or infinite ([`ValidationError::NonFiniteValue`])
    pub fn validate(&self) -> Result<(), GreenCueError> {
        if self.unit.trim().is_empty() {
            return Err(ValidationError::EmptyUnit.into());
        }
        if !self.value.is_finite() {
            return Err(ValidationError::NonFiniteValue.into());
        }
        Ok(())
    }

    /// Attach store-assigned identity and time.
    #[must_use]
    pub fn into_reading(self, id: ReadingId, observed_at: Timestamp) -> SensorReading {
        SensorReading {
            id,
            sensor_type: self.sensor_type,
            value: self.value,
            unit: self.unit,
            device_id: self.device_id,
            observed_at,
        }
    }
}

/// Step-by-step builder for [`NewReading`].
#[derive(Debug, Default)]
pub struct NewReadingBuilder {
    sensor_type: Option<SensorType>,
    value: Option<f32>,
    unit: Option<String>,
    device_id: Option<String>,
}

impl NewReadingBuilder {
    #[must_use]
    pub fn sensor_type(mut self, sensor_type: SensorType) -> Self {
        self.sensor_type = Some(sensor_type);
        self
    }

    #[must_use]
    pub fn value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Consume the builder, validate, and return a [`NewReading`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when type, value or unit is
    /// absent, or any error from [`NewReading::validate`].
    pub fn build(self) -> Result<NewReading, GreenCueError> {
        let reading = NewReading {
            sensor_type: self
                .sensor_type
                .ok_or(ValidationError::MissingField("type"))?,
            value: self.value.ok_or(ValidationError::MissingField("value"))?,
            unit: self.unit.ok_or(ValidationError::MissingField("unit"))?,
            device_id: self.device_id.filter(|id| !id.is_empty()),
        };
        reading.validate()?;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_codes_case_insensitively() {
        assert_eq!(SensorType::from_code("LIGHT").unwrap(), SensorType::Light);
        assert_eq!(SensorType::from_code("temp").unwrap(), SensorType::Temperature);
        assert_eq!(SensorType::from_code("Humi").unwrap(), SensorType::Humidity);
    }

    #[test]
    fn should_fail_closed_when_transport_name_is_unknown() {
        assert_eq!(
            SensorType::from_transport_name("temperature").unwrap(),
            SensorType::Temperature
        );
        assert_eq!(
            SensorType::from_transport_name("co2"),
            Err(ParseError::UnknownSensorType("co2".to_string()))
        );
        assert!(SensorType::from_transport_name("temp").is_err());
    }

    #[test]
    fn should_serialize_sensor_type_as_code() {
        let json = serde_json::to_string(&SensorType::Humidity).unwrap();
        assert_eq!(json, "\"humi\"");
    }

    #[test]
    fn should_build_reading_when_required_fields_present() {
        let reading = NewReading::builder()
            .sensor_type(SensorType::Light)
            .value(150.0)
            .unit("lux")
            .device_id("esp32-01")
            .build()
            .unwrap();
        assert_eq!(reading.sensor_type, SensorType::Light);
        assert_eq!(reading.device_id.as_deref(), Some("esp32-01"));
    }

    #[test]
    fn should_return_missing_field_when_unit_absent() {
        let err = NewReading::builder()
            .sensor_type(SensorType::Light)
            .value(150.0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GreenCueError::Validation(ValidationError::MissingField("unit"))
        ));
    }

    #[test]
    fn should_reject_blank_unit_and_nan_value() {
        let blank = NewReading::builder()
            .sensor_type(SensorType::Humidity)
            .value(40.0)
            .unit("  ")
            .build();
        assert!(matches!(
            blank,
            Err(GreenCueError::Validation(ValidationError::EmptyUnit))
        ));

        let nan = NewReading::builder()
            .sensor_type(SensorType::Humidity)
            .value(f32::NAN)
            .unit("%RH")
            .build();
        assert!(matches!(
            nan,
            Err(GreenCueError::Validation(ValidationError::NonFiniteValue))
        ));
    }
}
