//! Default-name policy for servers added without an explicit name.

use super::ServiceConfig;
use std::fmt;
use std::sync::Arc;

/// Name used when neither the access key nor the host supplies one.
pub const FALLBACK_SERVER_NAME: &str = "Unnamed server";

/// Host-provided callback deriving a display name from a connection.
pub type DefaultNameFn = Arc<dyn Fn(&ServiceConfig) -> String + Send + Sync>;

/// Chooses display names for new and migrated servers.
///
/// Precedence: the explicit name carried by the access key, then the
/// host-provided callback, then [`FALLBACK_SERVER_NAME`]. Blank candidates
/// fall through to the next source.
#[derive(Clone, Default)]
pub struct ServerNaming {
    default_name: Option<DefaultNameFn>,
}

impl ServerNaming {
    /// Creates a naming policy without a host callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a naming policy that consults `callback` for unnamed servers.
    #[must_use]
    pub fn with_default_name(
        callback: impl Fn(&ServiceConfig) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            default_name: Some(Arc::new(callback)),
        }
    }

    /// Returns the display name for a server.
    #[must_use]
    pub fn name_for(&self, explicit: Option<&str>, config: &ServiceConfig) -> String {
        if let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) {
            return name.to_owned();
        }

        self.default_name
            .as_ref()
            .map(|callback| callback(config))
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_SERVER_NAME.to_owned())
    }
}

impl fmt::Debug for ServerNaming {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServerNaming")
            .field("has_default_name", &self.default_name.is_some())
            .finish()
    }
}
