//! Core runtime for keydex: entities, values, secondary indexes, the query
//! engine, and the typed repository layer exported via the `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod entity;
pub mod error;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Separator between the segments of every backend key.
pub const KEY_SEPARATOR: char = ':';

/// Maximum number of segments in a dotted field path.
///
/// Keeps path resolution over embedded values bounded.
pub const MAX_FIELD_PATH_DEPTH: usize = 8;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores, serializers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            Db,
            query::{Predicate, Query, QueryBuilder, and, eq, near, or},
            repository::Repository,
            response::{Page, PageRequest},
        },
        entity::{Entity, EntityKind},
        model::{KeyspaceModel, Schema},
        types::{Distance, GeoPoint, Metric},
        value::Value,
    };
}
