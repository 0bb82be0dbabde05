//! MQTT transport configuration.

use serde::Deserialize;

/// Configuration for the MQTT device transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Connect to the broker at startup. When `false` every publish and
    /// subscribe fails with a transport error.
    pub enabled: bool,
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic prefix for sensor, status and control topics.
    pub namespace: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Buffered messages per subscription before new ones are dropped.
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "greencue-gateway".to_string(),
            namespace: "smartfarm".to_string(),
            keep_alive_secs: 30,
            username: None,
            password: None,
            channel_capacity: 64,
        }
    }
}
