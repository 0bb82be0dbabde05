//! # greencue-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the store port traits defined in `greencue-app::ports`
//!   (`ReadingStore`, `RuleStore`, `CommandStore`)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `greencue-app` (for port traits) and `greencue-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod command_store;
pub mod error;
pub mod pool;
pub mod reading_store;
pub mod rule_store;

mod codec;

pub use command_store::SqliteCommandStore;
pub use pool::{Config, Database};
pub use reading_store::SqliteReadingStore;
pub use rule_store::SqliteRuleStore;
