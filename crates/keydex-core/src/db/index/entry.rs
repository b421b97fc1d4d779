use crate::db::index::IndexRef;
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// BackRefs
///
/// Stored payload of `keyspace:id:idx`: every index entry that currently
/// belongs to the entity. Cleanup on update and delete is driven by this set.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BackRefs(BTreeSet<IndexRef>);

impl FromIterator<IndexRef> for BackRefs {
    fn from_iter<I: IntoIterator<Item = IndexRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
