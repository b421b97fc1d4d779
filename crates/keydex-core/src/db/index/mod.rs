//! Secondary indexes: equality entries and geo points, one backend key per
//! entity, kept in lockstep with entity writes.

mod entry;
mod key;
mod manager;


pub use entry::BackRefs;
pub use key::{IndexRef, equality_key, equality_prefix, geo_key, geo_prefix};
pub(crate) use manager::IndexManager;
