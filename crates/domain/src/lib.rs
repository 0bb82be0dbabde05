//! # greencue-domain
//!
//! Pure domain model for the greencue smart-farm gateway.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error taxonomy, timestamps
//! - Define **sensor readings** and the sensor types the farm reports
//! - Define **automation rules** with their parsed [`Condition`](automation::Condition)
//!   and [`Action`](automation::Action) views
//! - Define **control commands** and their transport topic/payload encoding
//! - Hold the two fixed natural-language rule templates
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod control;
pub mod sensor;
