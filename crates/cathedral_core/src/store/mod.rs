//! Persistent key-value store for the planner state blob.
//!
//! # Responsibility
//! - Define the storage contract (`KeyValueStore`) the state model writes to.
//! - Serialize whole values to JSON text under a single key.
//! - Fall back to a caller default on absent or unreadable data.
//!
//! # Invariants
//! - `PersistentStore::save` never panics; failures are returned, and the
//!   previously stored value stays in place.
//! - `PersistentStore::load` never fails; any problem yields the default.
//! - Two stores sharing a key are not coordinated: the last save wins.

use crate::db::DbError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_kv;
mod sqlite_kv;

pub use memory_kv::MemoryKvStore;
pub use sqlite_kv::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a durable read or write.
#[derive(Debug)]
pub enum StoreError {
    /// Value could not be turned into JSON text.
    Serialize(serde_json::Error),
    /// SQLite backend failure.
    Backend(DbError),
    /// Storage is disabled or over quota.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "serialization failed: {err}"),
            Self::Backend(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Backend(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Backend(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(DbError::Sqlite(value))
    }
}

/// Durable string slots addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// JSON (de)serialization over a `KeyValueStore` backend.
pub struct PersistentStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Serializes `value` and writes it under `key` as one overwrite.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        let text = serde_json::to_string(value).map_err(StoreError::Serialize)?;
        self.backend.set(key, &text)
    }

    /// Reads `key`, returning `default` when absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load_or_else(key, || default)
    }

    /// Like `load`, but only builds the default when it is needed.
    pub fn load_or_else<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        let text = match self.backend.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("event=store_load module=store status=fallback reason=absent key={key}");
                return default();
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=fallback reason=read_failed key={key} error={err}"
                );
                return default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=fallback reason=corrupt key={key} bytes={} error={err}",
                    text.len()
                );
                default()
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.backend.remove(key)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }
}
