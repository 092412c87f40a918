//! Error types for server domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing server domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerDomainError {
    /// An access key or connection definition is empty, malformed, or
    /// missing a required field.
    #[error("invalid service configuration: {reason}")]
    InvalidServiceConfiguration {
        /// Description of the validation failure.
        reason: String,
    },

    /// A server identifier is empty after trimming.
    #[error("server identifier must not be empty")]
    EmptyServerId,
}

impl ServerDomainError {
    /// Creates a [`ServerDomainError::InvalidServiceConfiguration`] error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidServiceConfiguration {
            reason: reason.into(),
        }
    }

    /// Returns `true` when the error describes an invalid access key or
    /// connection definition.
    #[must_use]
    pub const fn is_invalid_service_configuration(&self) -> bool {
        matches!(self, Self::InvalidServiceConfiguration { .. })
    }
}
