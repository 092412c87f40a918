//! Shared world state for server catalog BDD scenarios.

use std::sync::{Arc, Mutex};

use mockable::DefaultClock;
use proxy_catalog::server::{
    adapters::{FakeVpnApi, memory::InMemoryStorage},
    config::CatalogConfig,
    domain::Server,
    events::EventQueue,
    services::{ServerRepository, ServerRepositoryError},
};
use rstest::fixture;

/// Repository type used by the BDD world.
pub type TestRepository = ServerRepository<InMemoryStorage, FakeVpnApi, DefaultClock>;

/// Scenario world for server catalog behaviour tests.
pub struct CatalogWorld {
    /// Store backing the repository.
    pub store: Arc<InMemoryStorage>,
    /// Event queue shared with the repository.
    pub events: Arc<EventQueue>,
    /// Repository under test, once loaded.
    pub repository: Option<TestRepository>,
    /// Last successfully added server.
    pub last_added: Option<Server>,
    /// Result of the last add attempt.
    pub last_add_result: Option<Result<Server, ServerRepositoryError>>,
    /// Event names delivered to the recording subscriber.
    pub delivered: Arc<Mutex<Vec<String>>>,
}

impl CatalogWorld {
    /// Creates a world with an empty store and no repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStorage::new()),
            events: Arc::new(EventQueue::new()),
            repository: None,
            last_added: None,
            last_add_result: None,
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Loads a repository over the world's store.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored catalog cannot be loaded.
    pub fn load(&mut self) -> Result<(), eyre::Report> {
        let repository = ServerRepository::load(
            Arc::clone(&self.store),
            Arc::new(FakeVpnApi::new()),
            Arc::clone(&self.events),
            Arc::new(DefaultClock),
            CatalogConfig::new(),
        )
        .map_err(|err| eyre::eyre!("catalog load failed: {err}"))?;
        self.repository = Some(repository);
        Ok(())
    }

    /// Returns the loaded repository.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository has been loaded.
    pub fn repository(&self) -> Result<&TestRepository, eyre::Report> {
        self.repository
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no repository loaded in scenario world"))
    }

    /// Returns the last added server.
    ///
    /// # Errors
    ///
    /// Returns an error if no server has been added.
    pub fn last_added(&self) -> Result<&Server, eyre::Report> {
        self.last_added
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no server added in scenario world"))
    }
}

impl Default for CatalogWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CatalogWorld {
    CatalogWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
