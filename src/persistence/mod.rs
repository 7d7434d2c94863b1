//! Key-value persistence
//!
//! Features:
//! - Single-key reads
//! - Atomic read-modify-write updates (no lost updates between writers)
//! - In-memory and JSON-file backends
//! - Corrupt files read as empty instead of failing

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Edit applied inside [`KeyValueStore::update`]: receives the current value
/// and returns the new one (`None` removes the key).
pub type Edit<'a> = dyn FnMut(Option<&str>) -> Result<Option<String>> + 'a;

/// A string key-value store shared across the process
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Atomically replace the value under `key` with the result of `edit`.
    ///
    /// No other update may interleave between the read and the write. If
    /// `edit` fails nothing is written.
    fn update(&self, key: &str, edit: &mut Edit<'_>) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn update(&self, key: &str, edit: &mut Edit<'_>) -> Result<()> {
        (**self).update(key, edit)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn update(&self, key: &str, edit: &mut Edit<'_>) -> Result<()> {
        (**self).update(key, edit)
    }
}

pub(crate) fn poisoned() -> PersistenceError {
    PersistenceError::Unavailable("store lock poisoned".to_string())
}
