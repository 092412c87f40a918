//! Proxy catalog: the set of remote proxy-server definitions a client knows.
//!
//! This crate manages adding, renaming, forgetting (with undo), listing, and
//! persisting proxy-server access keys. Persisted catalogs are upgraded from
//! older on-disk schemas on read, and catalog changes are published to
//! subscribers through a deferred event queue.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and access-key parsing with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for storage and VPN validation
//! - **Adapters**: Concrete implementations of ports (memory, filesystem)
//!
//! # Modules
//!
//! - [`server`]: Server catalog, persistence, migration, and events

pub mod server;
