//! Runtime schema: which keyspaces exist and which of their fields are
//! indexed, geo-indexed, or references. Read once at startup.

mod keyspace;
mod schema;


pub use keyspace::*;
pub use schema::*;
