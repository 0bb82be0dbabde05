//! Device transport port: the messaging channel to sensors and actuators.

use std::future::Future;

use tokio::sync::mpsc;

use greencue_domain::error::GreenCueError;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Publishes to and subscribes on device topics.
///
/// Connection lifecycle, retry and timeouts belong to the implementation;
/// every call either completes or fails with [`GreenCueError::Transport`].
pub trait DeviceTransport {
    /// Publish `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send;

    /// Subscribe to `topic` (wildcards allowed). Messages are delivered on
    /// the returned channel until the transport shuts down.
    fn subscribe(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<InboundMessage>, GreenCueError>> + Send;
}

impl<T: DeviceTransport + Send + Sync> DeviceTransport for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send {
        (**self).publish(topic, payload)
    }

    fn subscribe(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<InboundMessage>, GreenCueError>> + Send {
        (**self).subscribe(topic)
    }
}
