use crate::db::backend::{Backend, BackendError, Operation};
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

///
/// MemoryBackend
///
/// Ordered in-process map. A batch is applied under one write-lock
/// acquisition, so readers observe it all-or-nothing.
///

#[derive(Debug, Default)]
pub struct MemoryBackend {
    map: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.read()?.is_empty())
    }

    /// All stored keys, in order.
    pub fn keys(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.read()?.keys().cloned().collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>, BackendError> {
        self.map
            .read()
            .map_err(|_| BackendError::LockPoisoned("memory backend".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>, BackendError> {
        self.map
            .write()
            .map_err(|_| BackendError::LockPoisoned("memory backend".to_string()))
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        self.write()?.insert(key.to_string(), value);

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.write()?.remove(key);

        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, BackendError> {
        let map = self.read()?;
        let range = map.range::<str, _>((Bound::Included(prefix), Bound::Unbounded));

        Ok(range
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<(), BackendError> {
        let mut map = self.write()?;
        for op in operations {
            match op {
                Operation::Put { key, value } => {
                    map.insert(key, value);
                }
                Operation::Delete { key } => {
                    map.remove(&key);
                }
            }
        }

        Ok(())
    }
}

///
/// TESTS
///
