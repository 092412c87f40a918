//! Adapter implementations for catalog storage and VPN validation ports.

pub mod file;
pub mod memory;

mod vpn;

pub use vpn::FakeVpnApi;
