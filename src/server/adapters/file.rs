//! Filesystem-backed key-value store scoped to a single directory.

use crate::server::ports::{KeyValueStore, KeyValueStoreError, KeyValueStoreResult};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;

const FILE_EXTENSION: &str = "json";

/// Key-value store that keeps each key in its own file.
///
/// All access goes through a capability handle for one directory, so keys
/// can never address files outside it. Writes go to a temporary file that
/// is then renamed over the target.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: Dir,
}

impl FileKeyValueStore {
    /// Opens the store rooted at `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError::Backend`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> KeyValueStoreResult<Self> {
        let (parent, name) = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_str().is_empty() => (parent, name),
            (_, Some(name)) => (Utf8Path::new("."), name),
            (_, None) => {
                return Dir::open_ambient_dir(path, ambient_authority())
                    .map(Self::from_dir)
                    .map_err(KeyValueStoreError::backend);
            }
        };
        let parent_dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(KeyValueStoreError::backend)?;
        parent_dir
            .create_dir_all(name)
            .map_err(KeyValueStoreError::backend)?;
        parent_dir
            .open_dir(name)
            .map(Self::from_dir)
            .map_err(KeyValueStoreError::backend)
    }

    /// Wraps an already-open directory capability.
    #[must_use]
    pub const fn from_dir(dir: Dir) -> Self {
        Self { dir }
    }

    fn file_name(key: &str) -> KeyValueStoreResult<String> {
        let is_valid = !key.is_empty()
            && !key.starts_with('.')
            && key.chars().all(|character| {
                character.is_ascii_alphanumeric() || matches!(character, '_' | '-' | '.')
            });
        if !is_valid {
            return Err(KeyValueStoreError::InvalidKey(key.to_owned()));
        }
        Ok(format!("{key}.{FILE_EXTENSION}"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> KeyValueStoreResult<Option<String>> {
        let file_name = Self::file_name(key)?;
        match self.dir.read_to_string(&file_name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(KeyValueStoreError::backend(err)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> KeyValueStoreResult<()> {
        let file_name = Self::file_name(key)?;
        let temp_name = format!(".{file_name}.tmp");
        self.dir
            .write(&temp_name, value)
            .map_err(KeyValueStoreError::backend)?;
        self.dir
            .rename(&temp_name, &self.dir, &file_name)
            .map_err(KeyValueStoreError::backend)?;
        tracing::debug!(key, bytes = value.len(), "stored item on disk");
        Ok(())
    }
}
