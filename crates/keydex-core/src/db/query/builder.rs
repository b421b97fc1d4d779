use crate::{
    db::{
        query::{Predicate, Query},
        response::PageRequest,
    },
    types::{Distance, GeoPoint},
};

///
/// QueryBuilder
///
/// Declarative builder for a [`Query`] over one keyspace.
///
/// - Purely structural: no schema access happens here
/// - Field paths are accepted as strings and checked when the query is planned
///

#[derive(Clone, Debug)]
pub struct QueryBuilder {
    keyspace: String,
    predicate: Option<Predicate>,
    page: Option<PageRequest>,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            predicate: None,
            page: None,
        }
    }

    /// Add a predicate, implicitly AND-ing with any existing predicate.
    #[must_use]
    pub fn filter(self, predicate: Predicate) -> Self {
        self.and(predicate)
    }

    /// Explicit AND combinator for predicates.
    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing & predicate,
            None => predicate,
        });
        self
    }

    /// Explicit OR combinator for predicates.
    #[must_use]
    pub fn or(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing | predicate,
            None => predicate,
        });
        self
    }

    /// Constrain results to a radius around `center`, AND-ed with the rest.
    #[must_use]
    pub fn near(self, field: impl Into<String>, center: GeoPoint, distance: Distance) -> Self {
        self.and(Predicate::near(field, center, distance))
    }

    /// Set or replace the page.
    #[must_use]
    pub const fn page(mut self, page: usize, size: usize) -> Self {
        self.page = Some(PageRequest::new(page, size));
        self
    }

    #[must_use]
    pub const fn page_request(mut self, request: PageRequest) -> Self {
        self.page = Some(request);
        self
    }

    #[must_use]
    pub fn build(self) -> Query {
        Query {
            keyspace: self.keyspace,
            predicate: self.predicate,
            page: self.page,
        }
    }
}
