//! Shared application state for axum handlers.

use std::sync::Arc;

use greencue_app::broadcast::InProcessBroadcast;
use greencue_app::services::command_service::CommandService;
use greencue_app::services::reading_service::ReadingService;
use greencue_app::services::rule_service::RuleService;
use greencue_app::services::sensor_ingestion::SensorIngestion;

/// Broadcast implementation the HTTP layer streams from.
pub type Broadcast = Arc<InProcessBroadcast>;

/// Application state shared across all axum handlers.
///
/// Generic over the reading store, latest-value cache, rule store, command
/// store and device transport to avoid dynamic dispatch. The broadcast
/// channel is the in-process one, since `/api/events/stream` subscribes to
/// it directly. `Clone` is implemented manually so that only the `Arc`
/// wrappers are cloned.
pub struct AppState<RS, C, R, S, T> {
    /// Reading queries (latest, recent, range).
    pub reading_service: Arc<ReadingService<RS, C, Broadcast>>,
    /// Automation rule management.
    pub rule_service: Arc<RuleService<R>>,
    /// Manual commands and command history.
    pub command_service: Arc<CommandService<S, T, Broadcast>>,
    /// Reading submission, which also runs the automation rules.
    pub ingestion: Arc<SensorIngestion<RS, C, Broadcast, R, S, T>>,
    /// Realtime fan-out for the SSE stream.
    pub broadcast: Broadcast,
}

impl<RS, C, R, S, T> Clone for AppState<RS, C, R, S, T> {
    fn clone(&self) -> Self {
        Self {
            reading_service: Arc::clone(&self.reading_service),
            rule_service: Arc::clone(&self.rule_service),
            command_service: Arc::clone(&self.command_service),
            ingestion: Arc::clone(&self.ingestion),
            broadcast: Arc::clone(&self.broadcast),
        }
    }
}

impl<RS, C, R, S, T> AppState<RS, C, R, S, T> {
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The services are usually shared with the telemetry bridge, so the
    /// caller keeps its own handles.
    pub fn from_arcs(
        reading_service: Arc<ReadingService<RS, C, Broadcast>>,
        rule_service: Arc<RuleService<R>>,
        command_service: Arc<CommandService<S, T, Broadcast>>,
        ingestion: Arc<SensorIngestion<RS, C, Broadcast, R, S, T>>,
        broadcast: Broadcast,
    ) -> Self {
        Self {
            reading_service,
            rule_service,
            command_service,
            ingestion,
            broadcast,
        }
    }
}
