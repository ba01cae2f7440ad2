//! Domain types and pure logic for the impact monitoring platform.
//!
//! This crate knows nothing about the network: it defines the entity
//! models mirrored from the hosted backend's tables, the shared error
//! taxonomy, caller-side validation, and the chart-ready aggregation
//! functions computed over in-memory entity lists.

pub mod alignment;
pub mod error;
pub mod metrics;
pub mod models;
pub mod types;
pub mod validation;
