use crate::{
    entity::Entity,
    error::Error,
    serialize::{deserialize, serialize},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// StoredRecord
/// Persisted form of an entity; keyspace and id live in the key.
///

#[derive(Deserialize, Serialize)]
struct StoredRecord {
    fields: BTreeMap<String, Value>,
}

pub(crate) fn encode_record(entity: &Entity) -> Result<Vec<u8>, Error> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        fields: &'a BTreeMap<String, Value>,
    }

    Ok(serialize(&Borrowed {
        fields: entity.fields(),
    })?)
}

pub(crate) fn decode_record(
    keyspace: &str,
    id: &str,
    key: &str,
    bytes: &[u8],
) -> Result<Entity, Error> {
    let record: StoredRecord = deserialize(bytes).map_err(|err| Error::corruption(key, err))?;

    Ok(Entity::from_parts(
        keyspace.to_string(),
        id.to_string(),
        record.fields,
    ))
}
