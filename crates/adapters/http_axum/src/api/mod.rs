//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automation;
#[allow(clippy::missing_errors_doc)]
pub mod control;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
pub mod sse;

use axum::Router;
use axum::routing::{get, post, put};

use greencue_app::ports::{CommandStore, DeviceTransport, LatestValueCache, ReadingStore, RuleStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<RS, C, R, S, T>() -> Router<AppState<RS, C, R, S, T>>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    Router::new()
        // Sensors
        .route("/sensor/data", post(sensors::submit::<RS, C, R, S, T>))
        .route("/sensor/types", get(sensors::types))
        .route(
            "/sensor/latest",
            get(sensors::latest_per_type::<RS, C, R, S, T>),
        )
        .route(
            "/sensor/latest/{type}",
            get(sensors::latest::<RS, C, R, S, T>),
        )
        .route(
            "/sensor/{type}/recent",
            get(sensors::recent::<RS, C, R, S, T>),
        )
        .route("/sensor/{type}/range", get(sensors::range::<RS, C, R, S, T>))
        // Automation
        .route(
            "/automation/rule",
            post(automation::create::<RS, C, R, S, T>),
        )
        .route(
            "/automation/natural-language",
            post(automation::create_from_natural_language::<RS, C, R, S, T>),
        )
        .route(
            "/automation/rules/active",
            get(automation::list_active::<RS, C, R, S, T>),
        )
        .route(
            "/automation/rule/{id}",
            get(automation::get::<RS, C, R, S, T>),
        )
        .route(
            "/automation/rule/{id}/toggle",
            put(automation::toggle::<RS, C, R, S, T>),
        )
        .route(
            "/automation/examples",
            get(automation::examples::<RS, C, R, S, T>),
        )
        // Control
        .route("/control/command", post(control::execute::<RS, C, R, S, T>))
        .route("/control/targets", get(control::targets))
        .route(
            "/control/{target}/recent",
            get(control::recent::<RS, C, R, S, T>),
        )
        .route(
            "/control/rule/{rule_id}",
            get(control::by_rule::<RS, C, R, S, T>),
        )
        // Realtime
        .route("/events/stream", get(sse::stream::<RS, C, R, S, T>))
}
