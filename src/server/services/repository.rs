//! Service layer owning the server catalog.

use crate::server::{
    config::CatalogConfig,
    domain::{Server, ServerDomainError, ServerId, ServerNaming, ServiceConfig, parse_access_key},
    events::{EventQueue, ServerEvent},
    ports::{KeyValueStore, VpnApi, VpnApiError},
    versioning::{CatalogMigrator, CatalogStorageError},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Service-level errors for catalog operations.
#[derive(Debug, Error)]
pub enum ServerRepositoryError {
    /// Access-key validation failed.
    #[error(transparent)]
    Domain(#[from] ServerDomainError),
    /// Loading or persisting the catalog failed.
    #[error(transparent)]
    Storage(#[from] CatalogStorageError),
    /// The VPN collaborator rejected the server.
    #[error(transparent)]
    Vpn(#[from] VpnApiError),
    /// An active server already reaches the same endpoint.
    #[error("server already added as {0}")]
    ServerAlreadyAdded(ServerId),
}

impl ServerRepositoryError {
    /// Returns `true` when the error reports an invalid access key.
    #[must_use]
    pub const fn is_invalid_service_configuration(&self) -> bool {
        matches!(
            self,
            Self::Domain(ServerDomainError::InvalidServiceConfiguration { .. })
        )
    }
}

/// Result type for catalog service operations.
pub type ServerRepositoryResult<T> = Result<T, ServerRepositoryError>;

#[derive(Debug, Default)]
struct CatalogState {
    active: Vec<Server>,
    forgotten: HashMap<ServerId, Server>,
}

impl CatalogState {
    fn position(&self, id: &str) -> Option<usize> {
        self.active
            .iter()
            .position(|server| server.id().as_str() == id)
    }

    fn find_same_endpoint(&self, config: &ServiceConfig) -> Option<&Server> {
        self.active
            .iter()
            .find(|server| server.config().same_endpoint(config))
    }

    fn is_known(&self, id: &ServerId) -> bool {
        self.forgotten.contains_key(id) || self.active.iter().any(|server| server.id() == id)
    }

    fn fresh_id(&self) -> ServerId {
        loop {
            let id = ServerId::generate();
            if !self.is_known(&id) {
                return id;
            }
        }
    }
}

/// Catalog of configured proxy servers.
///
/// Every mutation builds the next catalog, persists it in the current
/// schema, and only then commits it in memory and enqueues the matching
/// event. A failed write leaves both the in-memory catalog and the store as
/// they were. Events are delivered when the host calls
/// [`EventQueue::start_publishing`].
///
/// `rename`, `forget`, and `undo_forget` on unknown identifiers are silent
/// no-ops. Restored servers are appended to the end of the catalog.
pub struct ServerRepository<S, V, C>
where
    S: KeyValueStore,
    V: VpnApi,
    C: Clock + Send + Sync,
{
    migrator: CatalogMigrator<S>,
    vpn: Arc<V>,
    events: Arc<EventQueue>,
    clock: Arc<C>,
    naming: ServerNaming,
    state: RwLock<CatalogState>,
}

impl<S, V, C> ServerRepository<S, V, C>
where
    S: KeyValueStore,
    V: VpnApi,
    C: Clock + Send + Sync,
{
    /// Loads the persisted catalog and returns a ready repository.
    ///
    /// A legacy catalog is migrated and written back in the current schema
    /// before this returns. The first successful mutation persists it
    /// regardless.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::Storage`] when the stored catalog
    /// cannot be read, is corrupt, or is invalid. A failed migration
    /// write-back is logged and does not fail the load.
    pub fn load(
        store: Arc<S>,
        vpn: Arc<V>,
        events: Arc<EventQueue>,
        clock: Arc<C>,
        config: CatalogConfig,
    ) -> ServerRepositoryResult<Self> {
        let naming = config.naming().clone();
        let migrator = CatalogMigrator::new(store, config.storage_keys().clone(), naming.clone());
        let active = migrator.load()?;
        tracing::info!(servers = active.len(), "server repository ready");
        Ok(Self {
            migrator,
            vpn,
            events,
            clock,
            naming,
            state: RwLock::new(CatalogState {
                active,
                forgotten: HashMap::new(),
            }),
        })
    }

    /// Validates an access key without changing the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::Domain`] when the key is invalid or
    /// [`ServerRepositoryError::ServerAlreadyAdded`] when an active server
    /// already reaches the same endpoint.
    pub fn validate_access_key(&self, access_key: &str) -> ServerRepositoryResult<ServiceConfig> {
        let config = parse_access_key(access_key)?;
        if let Some(existing) = self.read_state().find_same_endpoint(&config) {
            return Err(ServerRepositoryError::ServerAlreadyAdded(
                existing.id().clone(),
            ));
        }
        Ok(config)
    }

    /// Adds a server from an access key and returns the new definition.
    ///
    /// The name comes from the key's fragment, then the host naming
    /// callback, then a generic fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::Domain`] for invalid keys,
    /// [`ServerRepositoryError::ServerAlreadyAdded`] for duplicates,
    /// [`ServerRepositoryError::Vpn`] when the VPN collaborator rejects the
    /// server, or [`ServerRepositoryError::Storage`] when persisting fails.
    /// The catalog is unchanged on every error.
    pub async fn add(&self, access_key: &str) -> ServerRepositoryResult<Server> {
        let config = self.validate_access_key(access_key)?;
        self.vpn.validate(&config).await?;

        let server = {
            let mut state = self.write_state();
            if let Some(existing) = state.find_same_endpoint(&config) {
                return Err(ServerRepositoryError::ServerAlreadyAdded(
                    existing.id().clone(),
                ));
            }
            let name = self.naming.name_for(config.tag(), &config);
            let server = Server::new(state.fresh_id(), name, config);

            let mut next = state.active.clone();
            next.push(server.clone());
            self.migrator.save(&next)?;
            state.active = next;
            server
        };

        tracing::info!(server_id = %server.id(), name = server.name(), "server added");
        self.events
            .enqueue(ServerEvent::added(server.clone(), &*self.clock));
        Ok(server)
    }

    /// Renames an active server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::Storage`] when persisting fails.
    pub fn rename(&self, id: &str, new_name: &str) -> ServerRepositoryResult<()> {
        let renamed = {
            let mut state = self.write_state();
            let Some(index) = state.position(id) else {
                tracing::debug!(server_id = id, "rename ignored for unknown server");
                return Ok(());
            };

            let mut next = state.active.clone();
            let Some(server) = next.get_mut(index) else {
                return Ok(());
            };
            server.rename(new_name);
            let renamed = server.clone();
            self.migrator.save(&next)?;
            state.active = next;
            renamed
        };

        tracing::info!(server_id = id, name = new_name, "server renamed");
        self.events
            .enqueue(ServerEvent::renamed(renamed, &*self.clock));
        Ok(())
    }

    /// Removes an active server, keeping it available to
    /// [`ServerRepository::undo_forget`].
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::Storage`] when persisting fails.
    pub fn forget(&self, id: &str) -> ServerRepositoryResult<()> {
        let forgotten = {
            let mut state = self.write_state();
            let Some(index) = state.position(id) else {
                tracing::debug!(server_id = id, "forget ignored for unknown server");
                return Ok(());
            };

            let mut next = state.active.clone();
            let server = next.remove(index);
            self.migrator.save(&next)?;
            state.active = next;
            state
                .forgotten
                .insert(server.id().clone(), server.clone());
            server
        };

        tracing::info!(server_id = id, "server forgotten");
        self.events
            .enqueue(ServerEvent::forgotten(forgotten, &*self.clock));
        Ok(())
    }

    /// Restores a forgotten server to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::ServerAlreadyAdded`] when the same
    /// endpoint was added again after the server was forgotten, or
    /// [`ServerRepositoryError::Storage`] when persisting fails. The server
    /// stays forgotten on error.
    pub fn undo_forget(&self, id: &str) -> ServerRepositoryResult<()> {
        let restored = {
            let mut state = self.write_state();
            let Some(server) = ServerId::new(id)
                .ok()
                .and_then(|key| state.forgotten.get(&key).cloned())
            else {
                tracing::debug!(server_id = id, "undo forget ignored for unknown server");
                return Ok(());
            };
            if let Some(existing) = state.find_same_endpoint(server.config()) {
                return Err(ServerRepositoryError::ServerAlreadyAdded(
                    existing.id().clone(),
                ));
            }

            let mut next = state.active.clone();
            next.push(server.clone());
            self.migrator.save(&next)?;
            state.active = next;
            state.forgotten.remove(server.id());
            server
        };

        tracing::info!(server_id = id, "server forget undone");
        self.events
            .enqueue(ServerEvent::forget_undone(restored, &*self.clock));
        Ok(())
    }

    /// Returns a snapshot of the active catalog in order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Server> {
        self.read_state().active.clone()
    }

    /// Returns the active server with `id`, if any.
    ///
    /// Forgotten servers are not returned until restored.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Server> {
        if id.is_empty() {
            return None;
        }
        let state = self.read_state();
        state
            .position(id)
            .and_then(|index| state.active.get(index))
            .cloned()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
