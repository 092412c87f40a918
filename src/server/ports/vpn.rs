//! VPN collaborator port consulted before a server is committed.

use crate::server::domain::ServiceConfig;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for VPN collaborator operations.
pub type VpnApiResult<T> = Result<T, VpnApiError>;

/// Connectivity and compatibility check for new servers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VpnApi: Send + Sync {
    /// Validates that `config` describes a usable server.
    ///
    /// # Errors
    ///
    /// Returns [`VpnApiError::Rejected`] when the server is unusable or
    /// [`VpnApiError::Unavailable`] when the check could not run.
    async fn validate(&self, config: &ServiceConfig) -> VpnApiResult<()>;
}

/// Errors returned by VPN collaborator adapters.
#[derive(Debug, Clone, Error)]
pub enum VpnApiError {
    /// The collaborator rejected the server.
    #[error("server {host}:{port} was rejected: {reason}")]
    Rejected {
        /// Rejected host.
        host: String,
        /// Rejected port.
        port: u16,
        /// Reason string.
        reason: String,
    },

    /// The collaborator could not perform the check.
    #[error("VPN API unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl VpnApiError {
    /// Creates a rejection for `config`.
    #[must_use]
    pub fn rejected(config: &ServiceConfig, reason: impl Into<String>) -> Self {
        Self::Rejected {
            host: config.host().to_owned(),
            port: config.port(),
            reason: reason.into(),
        }
    }

    /// Wraps a collaborator failure.
    #[must_use]
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
