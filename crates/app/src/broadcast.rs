//! In-process broadcast channel backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use greencue_domain::error::GreenCueError;

use crate::ports::{BroadcastChannel, BroadcastMessage};

/// In-process fan-out using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the message is simply dropped).
pub struct InProcessBroadcast {
    sender: broadcast::Sender<BroadcastMessage>,
}

impl InProcessBroadcast {
    /// Create a new channel with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to messages published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastMessage> {
        self.sender.subscribe()
    }
}

impl BroadcastChannel for InProcessBroadcast {
    fn publish(
        &self,
        channel: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), GreenCueError>> + Send {
        // send only fails when nobody listens
        let _ = self.sender.send(BroadcastMessage {
            channel: channel.to_string(),
            payload,
        });
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{COMMAND_CHANNEL, READING_CHANNEL};

    #[tokio::test]
    async fn should_deliver_message_to_every_subscriber() {
        let bus = InProcessBroadcast::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(READING_CHANNEL, serde_json::json!({"value": 150.0}))
            .await
            .unwrap();

        for rx in [&mut rx1, &mut rx2] {
            let msg = rx.recv().await.unwrap();
            assert_eq!(msg.channel, READING_CHANNEL);
            assert_eq!(msg.payload["value"], 150.0);
        }
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessBroadcast::new(16);
        let result = bus.publish(COMMAND_CHANNEL, serde_json::json!({})).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_messages_published_before_subscription() {
        let bus = InProcessBroadcast::new(16);
        bus.publish(READING_CHANNEL, serde_json::json!(1)).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(COMMAND_CHANNEL, serde_json::json!(2)).await.unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.channel, COMMAND_CHANNEL);
    }
}
