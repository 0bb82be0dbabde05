//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_service;
pub mod reading_service;
pub mod rule_service;
pub mod sensor_ingestion;

/// Page size used by the "recent" queries when the caller gives none.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;
