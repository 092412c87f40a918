//! Port contracts for catalog persistence and server validation.

mod storage;
mod vpn;

pub use storage::{KeyValueStore, KeyValueStoreError, KeyValueStoreResult};
#[cfg(test)]
pub use vpn::MockVpnApi;
pub use vpn::{VpnApi, VpnApiError, VpnApiResult};
