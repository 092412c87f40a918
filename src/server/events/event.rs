//! Catalog domain events.

use crate::server::domain::{Server, ServerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;

/// Kind of catalog change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEventKind {
    /// A server was added to the catalog.
    Added,
    /// A server's display name changed.
    Renamed,
    /// A server was removed and placed in the undo holding area.
    Forgotten,
    /// A forgotten server was restored to the catalog.
    ForgetUndone,
}

impl ServerEventKind {
    /// Returns the canonical event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "server_added",
            Self::Renamed => "server_renamed",
            Self::Forgotten => "server_forgotten",
            Self::ForgetUndone => "server_forget_undone",
        }
    }
}

impl fmt::Display for ServerEventKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Immutable record of a catalog change.
///
/// Events carry a snapshot of the affected server as it was immediately
/// after the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    kind: ServerEventKind,
    server: Server,
    occurred_at: DateTime<Utc>,
}

impl ServerEvent {
    /// Creates an event stamped with the clock's current time.
    #[must_use]
    pub fn new(kind: ServerEventKind, server: Server, clock: &impl Clock) -> Self {
        Self {
            kind,
            server,
            occurred_at: clock.utc(),
        }
    }

    /// Creates a [`ServerEventKind::Added`] event.
    #[must_use]
    pub fn added(server: Server, clock: &impl Clock) -> Self {
        Self::new(ServerEventKind::Added, server, clock)
    }

    /// Creates a [`ServerEventKind::Renamed`] event.
    #[must_use]
    pub fn renamed(server: Server, clock: &impl Clock) -> Self {
        Self::new(ServerEventKind::Renamed, server, clock)
    }

    /// Creates a [`ServerEventKind::Forgotten`] event.
    #[must_use]
    pub fn forgotten(server: Server, clock: &impl Clock) -> Self {
        Self::new(ServerEventKind::Forgotten, server, clock)
    }

    /// Creates a [`ServerEventKind::ForgetUndone`] event.
    #[must_use]
    pub fn forget_undone(server: Server, clock: &impl Clock) -> Self {
        Self::new(ServerEventKind::ForgetUndone, server, clock)
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> ServerEventKind {
        self.kind
    }

    /// Returns the affected server snapshot.
    #[must_use]
    pub const fn server(&self) -> &Server {
        &self.server
    }

    /// Returns the affected server's identifier.
    #[must_use]
    pub const fn server_id(&self) -> &ServerId {
        self.server.id()
    }

    /// Returns when the mutation happened.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
