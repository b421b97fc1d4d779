//! Entity records and keyspace membership in the backing store.

mod id_set;
mod key;
mod record;


pub use id_set::IdSet;
pub use key::*;
pub(crate) use record::{decode_record, encode_record};

use crate::{
    db::backend::Backend,
    entity::Entity,
    error::Error,
    serialize::{deserialize, serialize},
};
use serde::{Serialize, de::DeserializeOwned};

/// Decode the stored value of `key`; undecodable bytes are corruption.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, Error> {
    deserialize(bytes).map_err(|err| Error::corruption(key, err))
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
    Ok(serialize(value)?)
}

///
/// EntityStore
///
/// Read side of the entity records of every keyspace.
/// Writes go through the commit path so they land together with index deltas.
///

#[derive(Clone, Copy)]
pub(crate) struct EntityStore<'a> {
    backend: &'a dyn Backend,
}

impl<'a> EntityStore<'a> {
    pub(crate) const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Exact lookup; `None` when the id has no record.
    pub(crate) fn load(&self, keyspace: &str, id: &str) -> Result<Option<Entity>, Error> {
        let key = record_key(keyspace, id);
        self.backend
            .get(&key)?
            .map(|bytes| decode_record(keyspace, id, &key, &bytes))
            .transpose()
    }

    /// Fetch records for `ids` in order, skipping ids with no record.
    pub(crate) fn load_many<'i>(
        &self,
        keyspace: &str,
        ids: impl IntoIterator<Item = &'i String>,
    ) -> Result<Vec<Entity>, Error> {
        let mut out = Vec::new();
        for id in ids {
            match self.load(keyspace, id)? {
                Some(entity) => out.push(entity),
                None => {
                    tracing::trace!(keyspace, id = id.as_str(), "indexed id has no record");
                }
            }
        }

        Ok(out)
    }

    pub(crate) fn exists(&self, keyspace: &str, id: &str) -> Result<bool, Error> {
        Ok(self.backend.get(&record_key(keyspace, id))?.is_some())
    }

    /// Every live id of the keyspace.
    pub(crate) fn members(&self, keyspace: &str) -> Result<IdSet, Error> {
        let prefix = members_prefix(keyspace);
        let ids = self
            .backend
            .scan_prefix(&prefix)?
            .into_iter()
            .filter_map(|(key, _)| trailing_id(&prefix, &key))
            .collect();

        Ok(ids)
    }
}
