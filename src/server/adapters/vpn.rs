//! In-memory VPN collaborator for tests and offline use.

use crate::server::{
    domain::ServiceConfig,
    ports::{VpnApi, VpnApiError, VpnApiResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Fake VPN collaborator that accepts every server unless told otherwise.
///
/// Hosts registered with [`FakeVpnApi::reject_host`] fail validation with
/// the configured reason. Every validated host is recorded.
#[derive(Debug, Clone, Default)]
pub struct FakeVpnApi {
    state: Arc<RwLock<FakeVpnState>>,
}

#[derive(Debug, Default)]
struct FakeVpnState {
    rejected_hosts: HashMap<String, String>,
    validated_hosts: Vec<String>,
}

impl FakeVpnApi {
    /// Creates a collaborator that accepts every server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes validation fail for `host` with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`VpnApiError::Unavailable`] when lock acquisition fails.
    pub fn reject_host(
        &self,
        host: impl Into<String>,
        reason: impl Into<String>,
    ) -> VpnApiResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| VpnApiError::unavailable(std::io::Error::other(err.to_string())))?;
        state.rejected_hosts.insert(host.into(), reason.into());
        Ok(())
    }

    /// Returns every host passed to [`VpnApi::validate`], in call order.
    ///
    /// # Errors
    ///
    /// Returns [`VpnApiError::Unavailable`] when lock acquisition fails.
    pub fn validated_hosts(&self) -> VpnApiResult<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|err| VpnApiError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(state.validated_hosts.clone())
    }
}

#[async_trait]
impl VpnApi for FakeVpnApi {
    async fn validate(&self, config: &ServiceConfig) -> VpnApiResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| VpnApiError::unavailable(std::io::Error::other(err.to_string())))?;
        state.validated_hosts.push(config.host().to_owned());
        if let Some(reason) = state.rejected_hosts.get(config.host()) {
            return Err(VpnApiError::rejected(config, reason.clone()));
        }
        Ok(())
    }
}
