//! Write staging: one entity write plus its index deltas become a single
//! backend batch.

use crate::{
    db::{
        backend::{Backend, Operation},
        store::{decode, encode},
    },
    error::Error,
};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;

///
/// CommitBatch
///
/// Read-your-writes staging area over a backend.
/// Reads consult staged values first, so several deltas against the same
/// index key compose before anything reaches the backend.
///

pub(crate) struct CommitBatch<'a> {
    backend: &'a dyn Backend,
    staged: BTreeMap<String, Option<Vec<u8>>>,
    order: Vec<String>,
}

impl<'a> CommitBatch<'a> {
    pub(crate) fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            staged: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Decode the current value of `key`, staged or committed.
    pub(crate) fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        let bytes = match self.staged.get(key) {
            Some(staged) => staged.clone(),
            None => self.backend.get(key)?,
        };

        bytes.map(|bytes| decode(key, &bytes)).transpose()
    }

    pub(crate) fn put<T: Serialize>(&mut self, key: String, value: &T) -> Result<(), Error> {
        let bytes = encode(value)?;
        self.put_raw(key, bytes);

        Ok(())
    }

    pub(crate) fn put_raw(&mut self, key: String, bytes: Vec<u8>) {
        self.stage(key, Some(bytes));
    }

    pub(crate) fn delete(&mut self, key: String) {
        self.stage(key, None);
    }

    /// Apply every staged write as one backend batch.
    pub(crate) fn commit(self) -> Result<usize, Error> {
        let ops = self.operations();
        let count = ops.len();
        if count > 0 {
            self.backend_batch(ops)?;
        }

        Ok(count)
    }

    fn backend_batch(&self, ops: Vec<Operation>) -> Result<(), Error> {
        Ok(self.backend.batch(ops)?)
    }

    // Last write per key wins; keys keep first-touch order.
    fn operations(&self) -> Vec<Operation> {
        self.order
            .iter()
            .filter_map(|key| {
                self.staged.get(key).map(|value| match value {
                    Some(bytes) => Operation::Put {
                        key: key.clone(),
                        value: bytes.clone(),
                    },
                    None => Operation::Delete { key: key.clone() },
                })
            })
            .collect()
    }

    fn stage(&mut self, key: String, value: Option<Vec<u8>>) {
        if !self.staged.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.staged.insert(key, value);
    }
}

///
/// TESTS
///
