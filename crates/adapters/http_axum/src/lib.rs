//! # greencue-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON REST API** under `/api` for sensors, automation rules
//!   and actuator commands
//! - Stream broadcast channel messages to browsers as **Server-Sent Events**
//!   (`/api/events/stream`)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application errors into status codes and `{error, kind}` bodies
//!
//! ## Dependency rule
//! Depends on `greencue-app` (for port traits and services) and
//! `greencue-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
