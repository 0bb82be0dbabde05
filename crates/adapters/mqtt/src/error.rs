//! MQTT adapter error types.

use greencue_domain::error::GreenCueError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The transport is disabled, shut down, or waiting for the broker.
    #[error("MQTT client not connected")]
    NotConnected,

    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl From<MqttError> for GreenCueError {
    fn from(err: MqttError) -> Self {
        Self::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greencue_domain::error::ErrorKind;

    #[test]
    fn should_display_not_connected_error() {
        let err = MqttError::NotConnected;
        assert_eq!(err.to_string(), "MQTT client not connected");
    }

    #[test]
    fn should_convert_into_transport_error() {
        let err: GreenCueError = MqttError::NotConnected.into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.detail(), "transport error: MQTT client not connected");
    }
}
