//! Server catalog management.
//!
//! This module owns the catalog of configured proxy servers: validating
//! untrusted access keys, persisting the catalog through a key-value store
//! with migrate-on-read schema upgrades, and raising domain events when the
//! catalog changes. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Deferred event delivery in [`events`]
//! - Persisted schema and migration in [`versioning`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod services;
pub mod versioning;

#[cfg(test)]
mod tests;
