//! Domain model for the server catalog.
//!
//! The server domain models server identity, validated connection
//! definitions, the access-key wire format, and naming policy.
//! Infrastructure concerns remain outside this boundary.

mod access_key;
mod config;
mod error;
mod ids;
mod naming;
mod server;

pub use access_key::{ACCESS_KEY_SCHEME, parse_access_key, to_access_key};
pub use config::{KNOWN_CIPHER_METHODS, ServiceConfig};
pub use error::ServerDomainError;
pub use ids::ServerId;
pub use naming::{DefaultNameFn, FALLBACK_SERVER_NAME, ServerNaming};
pub use server::Server;
