//! # greencued: greencue gateway daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and install logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Connect the MQTT device transport
//! - Construct the stores, the reactive pipeline and the application services
//! - Start the telemetry bridge that feeds device readings into the pipeline
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use greencue_adapter_http_axum::state::AppState;
use greencue_adapter_mqtt::MqttTransport;
use greencue_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteCommandStore, SqliteReadingStore, SqliteRuleStore,
};
use greencue_app::automation_engine::AutomationEngine;
use greencue_app::broadcast::InProcessBroadcast;
use greencue_app::command_dispatcher::CommandDispatcher;
use greencue_app::latest_cache::InMemoryLatestCache;
use greencue_app::orchestrator::Orchestrator;
use greencue_app::services::command_service::CommandService;
use greencue_app::services::reading_service::ReadingService;
use greencue_app::services::rule_service::RuleService;
use greencue_app::services::sensor_ingestion::SensorIngestion;
use greencue_app::telemetry_bridge::TelemetryBridge;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(config.logging.level.to_ascii_lowercase().parse()?)
                .from_env_lossy(),
        )
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();
    tracing::info!(url = %config.database.url, "database ready");

    // Stores
    let reading_store = Arc::new(SqliteReadingStore::new(pool.clone()));
    let rule_store = Arc::new(SqliteRuleStore::new(pool.clone()));
    let command_store = Arc::new(SqliteCommandStore::new(pool));

    // Device transport, realtime channel and cache
    let transport = Arc::new(MqttTransport::connect(&config.mqtt));
    let broadcast = Arc::new(InProcessBroadcast::new(config.broadcast.capacity));
    let cache = config
        .cache
        .enabled
        .then(|| Arc::new(InMemoryLatestCache::new()));

    // Pipeline
    let dispatcher = Arc::new(
        CommandDispatcher::new(
            Arc::clone(&command_store),
            Arc::clone(&transport),
            Arc::clone(&broadcast),
        )
        .with_namespace(config.mqtt.namespace.clone()),
    );
    let orchestrator = Arc::new(Orchestrator::new(
        AutomationEngine::new(Arc::clone(&rule_store)),
        Arc::clone(&dispatcher),
    ));

    // Services
    let reading_service = Arc::new(ReadingService::new(
        reading_store,
        cache,
        Arc::clone(&broadcast),
    ));
    let ingestion = Arc::new(SensorIngestion::new(
        Arc::clone(&reading_service),
        orchestrator,
    ));
    let rule_service = Arc::new(RuleService::new(rule_store));
    let command_service = Arc::new(CommandService::new(command_store, dispatcher));

    // Telemetry
    let mut bridge = TelemetryBridge::new(Arc::clone(&transport), Arc::clone(&ingestion))
        .with_namespace(config.mqtt.namespace.clone());
    if let Err(err) = bridge.start().await {
        tracing::warn!(error = %err.detail(), "telemetry bridge not started, device readings will be ignored");
    }

    // HTTP
    let state = AppState::from_arcs(
        reading_service,
        rule_service,
        command_service,
        ingestion,
        broadcast,
    );
    let app = greencue_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, "greencued listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bridge.stop();
    transport.shutdown();
    tracing::info!("greencued stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
