//! Query descriptors: a predicate tree over indexed fields plus optional paging.

mod builder;
mod planner;
mod predicate;

#[cfg(test)]
mod tests;

pub use builder::QueryBuilder;
pub(crate) use planner::{QueryPlan, plan};
pub use predicate::{Predicate, and, eq, near, or};

use crate::db::response::PageRequest;
use serde::{Deserialize, Serialize};

///
/// Query
///
/// Immutable query over one keyspace.
/// With no predicate every live entity matches.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Query {
    pub keyspace: String,
    pub predicate: Option<Predicate>,
    pub page: Option<PageRequest>,
}

impl Query {
    /// Every live entity of `keyspace`, unpaged.
    #[must_use]
    pub fn all(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            predicate: None,
            page: None,
        }
    }

    #[must_use]
    pub fn filtered(keyspace: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            predicate: Some(predicate),
            ..Self::all(keyspace)
        }
    }

    #[must_use]
    pub fn with_page(mut self, request: PageRequest) -> Self {
        self.page = Some(request);
        self
    }
}
