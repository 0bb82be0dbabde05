//! # greencue-adapter-mqtt
//!
//! MQTT adapter: the device transport between the gateway and the farm's
//! sensors and actuators.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker and keep the connection alive
//! - Publish control commands (`<namespace>/control/<target>/<command>`)
//! - Deliver messages from subscribed topics (wildcards supported) to the
//!   application layer through channels
//!
//! ## Dependency rule
//! Same as other adapters: depends on `greencue-app` and `greencue-domain`.

pub mod config;
pub mod error;
pub mod topic;
pub mod transport;

pub use config::MqttConfig;
pub use transport::MqttTransport;
