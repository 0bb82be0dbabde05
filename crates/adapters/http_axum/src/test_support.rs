//! Router state wired over the in-memory ports of `greencue-app`.

use std::sync::Arc;

use greencue_app::automation_engine::AutomationEngine;
use greencue_app::broadcast::InProcessBroadcast;
use greencue_app::command_dispatcher::CommandDispatcher;
use greencue_app::latest_cache::InMemoryLatestCache;
use greencue_app::orchestrator::Orchestrator;
use greencue_app::services::command_service::CommandService;
use greencue_app::services::reading_service::ReadingService;
use greencue_app::services::rule_service::RuleService;
use greencue_app::services::sensor_ingestion::SensorIngestion;
use greencue_app::testing::{
    InMemoryCommandStore, InMemoryReadingStore, InMemoryRuleStore, SpyTransport,
};

use crate::state::AppState;

pub type TestState = AppState<
    Arc<InMemoryReadingStore>,
    Arc<InMemoryLatestCache>,
    Arc<InMemoryRuleStore>,
    Arc<InMemoryCommandStore>,
    Arc<SpyTransport>,
>;

/// Fully wired state plus a handle on the transport.
pub fn state() -> (TestState, Arc<SpyTransport>) {
    let readings = Arc::new(InMemoryReadingStore::default());
    let rules = Arc::new(InMemoryRuleStore::default());
    let commands = Arc::new(InMemoryCommandStore::default());
    let wire = Arc::new(SpyTransport::default());
    let broadcast = Arc::new(InProcessBroadcast::new(16));

    let reading_service = Arc::new(ReadingService::new(
        Arc::clone(&readings),
        Arc::new(InMemoryLatestCache::new()),
        Arc::clone(&broadcast),
    ));
    let dispatcher = Arc::new(CommandDispatcher::new(
        Arc::clone(&commands),
        Arc::clone(&wire),
        Arc::clone(&broadcast),
    ));
    let orchestrator = Arc::new(Orchestrator::new(
        AutomationEngine::new(Arc::clone(&rules)),
        Arc::clone(&dispatcher),
    ));
    let ingestion = Arc::new(SensorIngestion::new(
        Arc::clone(&reading_service),
        orchestrator,
    ));

    let state = AppState::from_arcs(
        reading_service,
        Arc::new(RuleService::new(rules)),
        Arc::new(CommandService::new(commands, dispatcher)),
        ingestion,
        broadcast,
    );
    (state, wire)
}
