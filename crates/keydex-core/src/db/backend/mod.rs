//! Backing key-value store boundary.
//!
//! The core persists records and index structures through [`Backend`] only.
//! Implementations own connection management, retries and timeouts; the core
//! surfaces their failures unchanged as `StoreUnavailable`.

mod memory;

pub use memory::MemoryBackend;

use thiserror::Error as ThisError;

///
/// BackendError
///

#[derive(Clone, Debug, ThisError)]
pub enum BackendError {
    #[error("i/o error: {0}")]
    Io(String),

    #[error("backend lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("unsupported backend operation: {0}")]
    Unsupported(String),
}

///
/// Operation
/// A single write inside a [`Backend::batch`].
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl Operation {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

///
/// Backend
///
/// Implementations must be thread-safe; one instance is shared by every
/// caller of a [`Db`](crate::db::Db).
///

pub trait Backend: Send + Sync {
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Insert or overwrite a key.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError>;

    /// Returns `Ok(())` even if the key doesn't exist.
    fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Every `(key, value)` whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, BackendError>;

    /// Apply all operations, in order, as one unit.
    ///
    /// Either every operation is visible to readers or none is.
    fn batch(&self, operations: Vec<Operation>) -> Result<(), BackendError>;
}
