//! Telemetry bridge: turns inbound device messages into ingested readings.
//!
//! Subscribes once per known sensor transport name to
//! `<namespace>/sensor/<name>/data`, plus the device status topic
//! `<namespace>/status/+`. Each subscription is drained by its own task; a
//! message that fails to decode or ingest is logged and dropped without
//! ending the subscription.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use greencue_domain::error::{GreenCueError, ValidationError};
use greencue_domain::sensor::{NewReading, SensorType};

use crate::command_dispatcher::DEFAULT_NAMESPACE;
use crate::ports::{DeviceTransport, InboundMessage, ReadingSink};

/// Inbound sensor payload.
#[derive(Debug, Deserialize)]
struct TelemetryPayload {
    value: Option<NumericValue>,
    unit: Option<String>,
    #[serde(alias = "deviceId")]
    device_id: Option<String>,
}

/// Devices send the value either as a JSON number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumericValue {
    Number(f32),
    Text(String),
}

impl NumericValue {
    fn into_f32(self) -> Result<f32, ValidationError> {
        match self {
            Self::Number(v) => Ok(v),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| ValidationError::MalformedPayload(format!("value {text:?} is not numeric"))),
        }
    }
}

/// Inbound status payload. `status` is whatever the actuator reports about
/// itself, usually an object such as `{"type": "led", "state": {...}}`.
#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(alias = "deviceId")]
    device_id: Option<String>,
    #[serde(default)]
    status: serde_json::Value,
}

#[derive(Debug, PartialEq)]
struct DeviceStatus {
    device_id: String,
    status: serde_json::Value,
}

/// Topic a device publishes `sensor_type` readings on.
#[must_use]
pub fn sensor_topic(namespace: &str, sensor_type: SensorType) -> String {
    format!("{namespace}/sensor/{}/data", sensor_type.transport_name())
}

/// Wildcard topic devices report their status on.
#[must_use]
pub fn status_topic(namespace: &str) -> String {
    format!("{namespace}/status/+")
}

/// Sensor transport name embedded in a `<ns>/sensor/<name>/data` topic.
fn sensor_name(topic: &str) -> Option<&str> {
    let mut segments = topic.rsplit('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("data"), Some(name), Some("sensor")) => Some(name),
        _ => None,
    }
}

/// Decode a message received on a sensor topic into a [`NewReading`].
///
/// The sensor type comes from the topic; unknown names are rejected. A
/// missing `unit` falls back to the sensor type's default unit.
///
/// # Errors
///
/// Returns [`GreenCueError::Parse`] for an unknown sensor name and
/// [`GreenCueError::Validation`] for a malformed or incomplete payload.
pub fn decode_reading(message: &InboundMessage) -> Result<NewReading, GreenCueError> {
    let name = sensor_name(&message.topic).ok_or_else(|| {
        ValidationError::MalformedPayload(format!("unexpected topic {}", message.topic))
    })?;
    let sensor_type = SensorType::from_transport_name(name)?;

    let payload: TelemetryPayload = serde_json::from_slice(&message.payload)
        .map_err(|err| ValidationError::MalformedPayload(err.to_string()))?;
    let value = payload
        .value
        .ok_or(ValidationError::MissingField("value"))?
        .into_f32()?;
    let unit = payload
        .unit
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| sensor_type.default_unit().to_string());

    let mut builder = NewReading::builder()
        .sensor_type(sensor_type)
        .value(value)
        .unit(unit);
    if let Some(device_id) = payload.device_id {
        builder = builder.device_id(device_id);
    }
    builder.build()
}

/// Decode a status message. Without a `device_id` field the device is named
/// by the last topic segment.
fn decode_status(message: &InboundMessage) -> Result<DeviceStatus, serde_json::Error> {
    let payload: StatusPayload = serde_json::from_slice(&message.payload)?;
    let device_id = payload
        .device_id
        .filter(|id| !id.is_empty())
        .or_else(|| message.topic.rsplit('/').next().map(str::to_string))
        .unwrap_or_default();
    Ok(DeviceStatus {
        device_id,
        status: payload.status,
    })
}

/// Subscribes to device telemetry and feeds it to a [`ReadingSink`].
pub struct TelemetryBridge<T, K> {
    transport: T,
    sink: Arc<K>,
    namespace: String,
    tasks: Vec<JoinHandle<()>>,
}

impl<T, K> TelemetryBridge<T, K>
where
    T: DeviceTransport,
    K: ReadingSink + Send + Sync + 'static,
{
    pub fn new(transport: T, sink: Arc<K>) -> Self {
        Self {
            transport,
            sink,
            namespace: DEFAULT_NAMESPACE.to_string(),
            tasks: Vec::new(),
        }
    }

    /// Override the topic namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Subscribe to every sensor topic and the status topic.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the first subscription that fails.
    /// Subscriptions made before the failure stay active.
    #[tracing::instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn start(&mut self) -> Result<(), GreenCueError> {
        for sensor_type in SensorType::ALL {
            let topic = sensor_topic(&self.namespace, sensor_type);
            let rx = self.transport.subscribe(&topic).await?;
            let sink = Arc::clone(&self.sink);
            self.tasks.push(tokio::spawn(forward_readings(rx, sink)));
            tracing::info!(%topic, "subscribed to sensor telemetry");
        }

        let topic = status_topic(&self.namespace);
        let rx = self.transport.subscribe(&topic).await?;
        self.tasks.push(tokio::spawn(log_status(rx)));
        tracing::info!(%topic, "subscribed to device status");
        Ok(())
    }

    /// Abort every subscription task.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl<T, K> Drop for TelemetryBridge<T, K> {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn forward_readings<K: ReadingSink>(mut rx: mpsc::Receiver<InboundMessage>, sink: Arc<K>) {
    while let Some(message) = rx.recv().await {
        let reading = match decode_reading(&message) {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(topic = %message.topic, kind = %err.kind(), error = %err.detail(), "dropping undecodable telemetry");
                continue;
            }
        };
        if let Err(err) = sink.ingest(reading).await {
            tracing::warn!(topic = %message.topic, kind = %err.kind(), error = %err.detail(), "failed to ingest telemetry");
        }
    }
    tracing::debug!("telemetry subscription closed");
}

async fn log_status(mut rx: mpsc::Receiver<InboundMessage>) {
    while let Some(message) = rx.recv().await {
        match decode_status(&message) {
            Ok(status) => tracing::info!(
                topic = %message.topic,
                device_id = %status.device_id,
                status = %status.status,
                "device status"
            ),
            Err(err) => tracing::warn!(topic = %message.topic, error = %err, "malformed device status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use greencue_domain::error::{ErrorKind, ParseError};
    use greencue_domain::id::ReadingId;
    use greencue_domain::sensor::SensorReading;
    use greencue_domain::time::now;

    use crate::testing::SpyTransport;

    struct ChannelSink {
        tx: mpsc::UnboundedSender<NewReading>,
    }

    impl ReadingSink for ChannelSink {
        async fn ingest(&self, reading: NewReading) -> Result<SensorReading, GreenCueError> {
            let _ = self.tx.send(reading.clone());
            Ok(reading.into_reading(ReadingId::new(), now()))
        }
    }

    fn message(topic: &str, payload: &str) -> InboundMessage {
        InboundMessage {
            topic: topic.to_string(),
            payload: payload.as_bytes().to_vec(),
        }
    }

    #[test]
    fn should_decode_numeric_and_string_values() {
        let numeric = decode_reading(&message(
            "smartfarm/sensor/temperature/data",
            r#"{"value": 24.5, "unit": "℃", "device_id": "esp32-01"}"#,
        ))
        .unwrap();
        assert_eq!(numeric.sensor_type, SensorType::Temperature);
        assert_eq!(numeric.device_id.as_deref(), Some("esp32-01"));

        let text = decode_reading(&message(
            "smartfarm/sensor/humidity/data",
            r#"{"value": "61.2", "unit": "%RH"}"#,
        ))
        .unwrap();
        assert_eq!(text.sensor_type, SensorType::Humidity);
        assert!((text.value - 61.2).abs() < 1e-4);
    }

    #[test]
    fn should_fall_back_to_default_unit() {
        let reading =
            decode_reading(&message("smartfarm/sensor/light/data", r#"{"value": 320}"#)).unwrap();
        assert_eq!(reading.unit, "lux");
    }

    #[test]
    fn should_fail_closed_for_unknown_sensor_name() {
        let err =
            decode_reading(&message("smartfarm/sensor/co2/data", r#"{"value": 400}"#)).unwrap_err();
        assert!(matches!(
            err,
            GreenCueError::Parse(ParseError::UnknownSensorType(name)) if name == "co2"
        ));
    }

    #[test]
    fn should_reject_malformed_payloads() {
        for payload in ["not json", r#"{"unit": "lux"}"#, r#"{"value": "bright"}"#] {
            let err = decode_reading(&message("smartfarm/sensor/light/data", payload)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn should_decode_actuator_state_object_as_status() {
        let status = decode_status(&message(
            "smartfarm/status/rpi-01",
            r#"{"status": {"actuator_id": "led1", "type": "led", "state": {"on": true}}, "device_id": "rpi-01", "timestamp": 1700000000000}"#,
        ))
        .unwrap();

        assert_eq!(status.device_id, "rpi-01");
        assert_eq!(status.status["type"], "led");
        assert_eq!(status.status["state"]["on"], true);
    }

    #[test]
    fn should_name_device_after_topic_when_payload_omits_it() {
        let status =
            decode_status(&message("smartfarm/status/esp32-02", r#"{"status": "online"}"#)).unwrap();
        assert_eq!(status.device_id, "esp32-02");
        assert_eq!(status.status, serde_json::json!("online"));

        let bare = decode_status(&message("smartfarm/status/esp32-02", "{}")).unwrap();
        assert!(bare.status.is_null());
    }

    #[test]
    fn should_reject_status_that_is_not_json_object() {
        assert!(decode_status(&message("smartfarm/status/rpi-01", "on")).is_err());
        assert!(decode_status(&message("smartfarm/status/rpi-01", "[1, 2]")).is_err());
    }

    #[tokio::test]
    async fn should_subscribe_to_each_sensor_topic_and_status() {
        let transport = Arc::new(SpyTransport::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut bridge = TelemetryBridge::new(Arc::clone(&transport), Arc::new(ChannelSink { tx }));

        bridge.start().await.unwrap();

        assert_eq!(
            transport.subscribed_topics(),
            vec![
                "smartfarm/sensor/light/data",
                "smartfarm/sensor/temperature/data",
                "smartfarm/sensor/humidity/data",
                "smartfarm/status/+",
            ]
        );
        bridge.stop();
    }

    #[tokio::test]
    async fn should_keep_subscription_alive_after_bad_message() {
        let transport = Arc::new(SpyTransport::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bridge = TelemetryBridge::new(Arc::clone(&transport), Arc::new(ChannelSink { tx }));
        bridge.start().await.unwrap();

        let topic = "smartfarm/sensor/light/data";
        let sender = transport.sender(topic);
        sender.send(message(topic, "{broken")).await.unwrap();
        sender
            .send(message(topic, r#"{"value": 150, "unit": "lux"}"#))
            .await
            .unwrap();

        let reading = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reading.sensor_type, SensorType::Light);
        assert!((reading.value - 150.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn should_fail_to_start_when_transport_unavailable() {
        let transport = Arc::new(SpyTransport::failing());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut bridge = TelemetryBridge::new(transport, Arc::new(ChannelSink { tx }));

        let err = bridge.start().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
