//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod broadcast;
pub mod command_store;
pub mod device_transport;
pub mod latest_cache;
pub mod reading_sink;
pub mod reading_store;
pub mod rule_store;

pub use broadcast::{BroadcastChannel, BroadcastMessage, COMMAND_CHANNEL, READING_CHANNEL};
pub use command_store::CommandStore;
pub use device_transport::{DeviceTransport, InboundMessage};
pub use latest_cache::LatestValueCache;
pub use reading_sink::ReadingSink;
pub use reading_store::ReadingStore;
pub use rule_store::RuleStore;
