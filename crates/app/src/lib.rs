//! # greencue-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ReadingStore`, `RuleStore`, `CommandStore`: durable storage
//!   - `DeviceTransport`: publish/subscribe with sensors and actuators
//!   - `BroadcastChannel`: realtime fan-out to observers
//!   - `LatestValueCache`: single-slot latest reading per sensor type
//! - Run the reactive pipeline: `AutomationEngine` → command synthesis →
//!   `CommandDispatcher`, driven by the `Orchestrator`
//! - Expose use-case services (`ReadingService`, `RuleService`,
//!   `CommandService`, `SensorIngestion`) and the `TelemetryBridge`
//! - Provide **in-process infrastructure** (broadcast channel, latest-value cache)
//!
//! ## Dependency rule
//! Depends on `greencue-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod automation_engine;
pub mod broadcast;
pub mod command_dispatcher;
pub mod command_synthesizer;
pub mod latest_cache;
pub mod orchestrator;
pub mod ports;
pub mod services;
pub mod telemetry_bridge;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
