//! In-memory key-value store.

use crate::server::ports::{KeyValueStore, KeyValueStoreError, KeyValueStoreResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory key-value store.
///
/// Writes can be switched off with [`InMemoryStorage::set_read_only`] to
/// exercise persistence failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<RwLock<InMemoryStorageState>>,
}

#[derive(Debug, Default)]
struct InMemoryStorageState {
    items: HashMap<String, String>,
    read_only: bool,
}

impl InMemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `items`.
    #[must_use]
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let state = InMemoryStorageState {
            items: items
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            read_only: false,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Makes subsequent writes fail when `read_only` is `true`.
    ///
    /// # Errors
    ///
    /// Returns storage errors when lock acquisition fails.
    pub fn set_read_only(&self, read_only: bool) -> KeyValueStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            KeyValueStoreError::backend(std::io::Error::other(err.to_string()))
        })?;
        state.read_only = read_only;
        Ok(())
    }
}

impl KeyValueStore for InMemoryStorage {
    fn get_item(&self, key: &str) -> KeyValueStoreResult<Option<String>> {
        let state = self.state.read().map_err(|err| {
            KeyValueStoreError::backend(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> KeyValueStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            KeyValueStoreError::backend(std::io::Error::other(err.to_string()))
        })?;
        if state.read_only {
            return Err(KeyValueStoreError::backend(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "in-memory storage is read-only",
            )));
        }
        state.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
