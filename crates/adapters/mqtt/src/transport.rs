//! [`DeviceTransport`] over MQTT using rumqttc.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use greencue_app::ports::{DeviceTransport, InboundMessage};
use greencue_domain::error::GreenCueError;

use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::topic;

/// Capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 64;

/// Pause between reconnection attempts after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

struct Route {
    filter: String,
    tx: mpsc::Sender<InboundMessage>,
}

type Routes = Arc<Mutex<Vec<Route>>>;

/// MQTT device transport.
///
/// Publishes with QoS 1 and no retain. A background task drives the rumqttc
/// event loop, fans incoming publishes out to every matching subscription,
/// and re-issues subscriptions after each reconnect.
///
/// No call waits on the broker. Publishing while disconnected, or with the
/// request queue full, fails immediately. Subscribing while disconnected
/// registers the route and defers the broker request to the next connect.
pub struct MqttTransport {
    client: Option<AsyncClient>,
    routes: Routes,
    connected: Arc<AtomicBool>,
    event_loop: Option<JoinHandle<()>>,
    channel_capacity: usize,
}

impl MqttTransport {
    /// Create the client and spawn its event loop on the current runtime.
    ///
    /// Returns a disabled transport when `config.enabled` is `false`.
    #[must_use]
    pub fn connect(config: &MqttConfig) -> Self {
        if !config.enabled {
            tracing::info!("MQTT transport disabled");
            return Self::disabled();
        }

        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let routes: Routes = Arc::default();
        let connected = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run_event_loop(
            event_loop,
            client.clone(),
            Arc::clone(&routes),
            Arc::clone(&connected),
        ));
        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "MQTT transport started"
        );

        Self {
            client: Some(client),
            routes,
            connected,
            event_loop: Some(handle),
            channel_capacity: config.channel_capacity.max(1),
        }
    }

    /// A transport that rejects every call with [`MqttError::NotConnected`].
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: None,
            routes: Arc::default(),
            connected: Arc::default(),
            event_loop: None,
            channel_capacity: 1,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Whether the broker acknowledged the current connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Ask the broker for a clean disconnect.
    ///
    /// The event loop itself stops when the transport is dropped.
    pub fn shutdown(&self) {
        self.connected.store(false, Ordering::Release);
        if let Some(client) = &self.client
            && let Err(err) = client.try_disconnect()
        {
            tracing::warn!(error = %err, "MQTT disconnect failed");
        }
    }

    fn client(&self) -> Result<&AsyncClient, MqttError> {
        self.client.as_ref().ok_or(MqttError::NotConnected)
    }

    fn connected_client(&self) -> Result<&AsyncClient, MqttError> {
        let client = self.client()?;
        if self.is_connected() {
            Ok(client)
        } else {
            Err(MqttError::NotConnected)
        }
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.event_loop.take() {
            handle.abort();
        }
    }
}

impl DeviceTransport for MqttTransport {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), GreenCueError> {
        self.connected_client()?
            .try_publish(topic, QoS::AtLeastOnce, false, payload.into_bytes())
            .map_err(MqttError::Client)?;
        tracing::debug!(%topic, "published");
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<mpsc::Receiver<InboundMessage>, GreenCueError> {
        let client = self.client()?;
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        // Held across the check so a concurrent ConnAck sees this route.
        let mut routes = lock(&self.routes);
        if self.is_connected() {
            client
                .try_subscribe(topic, QoS::AtLeastOnce)
                .map_err(MqttError::Client)?;
            tracing::debug!(%topic, "subscribed");
        } else {
            tracing::debug!(%topic, "subscription deferred until connected");
        }
        routes.push(Route {
            filter: topic.to_string(),
            tx,
        });
        Ok(rx)
    }
}

fn lock(routes: &Routes) -> std::sync::MutexGuard<'_, Vec<Route>> {
    routes.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_event_loop(
    mut event_loop: EventLoop,
    client: AsyncClient,
    routes: Routes,
    connected: Arc<AtomicBool>,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                route(&routes, &publish.topic, &publish.payload);
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
                resubscribe(&client, &routes, &connected);
            }
            Ok(_) => {}
            Err(err) => {
                connected.store(false, Ordering::Release);
                tracing::warn!(error = %err, "MQTT connection error, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Deliver a publish to every subscription whose filter matches `topic`.
fn route(routes: &Routes, topic: &str, payload: &[u8]) {
    let mut routes = lock(routes);
    routes.retain(|r| !r.tx.is_closed());
    for r in routes.iter().filter(|r| topic::matches(&r.filter, topic)) {
        let message = InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        };
        if let Err(err) = r.tx.try_send(message) {
            tracing::warn!(%topic, filter = %r.filter, error = %err, "subscriber lagging, message dropped");
        }
    }
}

fn resubscribe(client: &AsyncClient, routes: &Routes, connected: &AtomicBool) {
    let filters: Vec<String> = {
        let routes = lock(routes);
        connected.store(true, Ordering::Release);
        routes.iter().map(|r| r.filter.clone()).collect()
    };
    for filter in filters {
        if let Err(err) = client.try_subscribe(filter.clone(), QoS::AtLeastOnce) {
            tracing::warn!(%filter, error = %err, "failed to restore subscription");
        }
    }
}
