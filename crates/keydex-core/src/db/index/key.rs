use crate::{KEY_SEPARATOR, db::store::escape_segment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `keyspace:path:value:index:`, shared by every id whose `path` equals `value`.
#[must_use]
pub fn equality_prefix(keyspace: &str, path: &str, token: &str) -> String {
    format!(
        "{keyspace}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}index{KEY_SEPARATOR}",
        escape_segment(path),
        escape_segment(token)
    )
}

/// Equality entry of entity `id`; the payload is empty.
#[must_use]
pub fn equality_key(keyspace: &str, path: &str, token: &str, id: &str) -> String {
    format!(
        "{}{}",
        equality_prefix(keyspace, path, token),
        escape_segment(id)
    )
}

/// `keyspace:path:geo:`, shared by every point of one geo-indexed path.
#[must_use]
pub fn geo_prefix(keyspace: &str, path: &str) -> String {
    format!(
        "{keyspace}{KEY_SEPARATOR}{}{KEY_SEPARATOR}geo{KEY_SEPARATOR}",
        escape_segment(path)
    )
}

/// Geo entry of entity `id`; the payload is its point.
#[must_use]
pub fn geo_key(keyspace: &str, path: &str, id: &str) -> String {
    format!("{}{}", geo_prefix(keyspace, path), escape_segment(id))
}

///
/// IndexRef
///
/// Backend key of one index entry belonging to an entity.
/// Ordered so back-reference sets diff deterministically.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum IndexRef {
    Equality(String),
    Geo(String),
}

impl IndexRef {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Equality(key) | Self::Geo(key) => key,
        }
    }
}

impl fmt::Display for IndexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
