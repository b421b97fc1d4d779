use crate::{
    db::{
        Db,
        query::{Predicate, Query, QueryBuilder},
        response::{Page, PageRequest},
    },
    entity::EntityKind,
    error::Error,
};
use std::marker::PhantomData;

///
/// Repository
///
/// Typed view of one keyspace.
/// Values are converted through [`EntityKind`] on the way in and out; reads
/// see references already resolved.
///

pub struct Repository<'a, E: EntityKind> {
    db: &'a Db,
    _marker: PhantomData<E>,
}

impl<'a, E: EntityKind> Repository<'a, E> {
    #[must_use]
    pub const fn new(db: &'a Db) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Save `value` and write the assigned id back into it.
    pub fn save(&self, mut value: E) -> Result<E, Error> {
        let id = self.db.save(value.to_entity())?;
        value.set_id(id);

        Ok(value)
    }

    /// Save each value in order; fail-fast, earlier saves persist.
    pub fn save_all(&self, values: impl IntoIterator<Item = E>) -> Result<Vec<E>, Error> {
        values.into_iter().map(|value| self.save(value)).collect()
    }

    pub fn delete_by_id(&self, id: &str) -> Result<bool, Error> {
        self.db.delete_by_id(E::KEYSPACE, id)
    }

    pub fn delete_all(&self) -> Result<u64, Error> {
        self.db.delete_all(E::KEYSPACE)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn find_by_id(&self, id: &str) -> Result<Option<E>, Error> {
        self.db
            .find_by_id(E::KEYSPACE, id)?
            .map(E::from_entity)
            .transpose()
    }

    pub fn exists(&self, id: &str) -> Result<bool, Error> {
        self.db.exists(E::KEYSPACE, id)
    }

    pub fn count(&self) -> Result<u64, Error> {
        self.db.count(E::KEYSPACE)
    }

    pub fn find_all(&self) -> Result<Vec<E>, Error> {
        self.execute(&Query::all(E::KEYSPACE))
            .map(Page::into_items)
    }

    /// Every match of `predicate`, in id order.
    pub fn find(&self, predicate: Predicate) -> Result<Vec<E>, Error> {
        self.execute(&Query::filtered(E::KEYSPACE, predicate))
            .map(Page::into_items)
    }

    pub fn find_page(&self, predicate: Predicate, page: PageRequest) -> Result<Page<E>, Error> {
        self.execute(&Query::filtered(E::KEYSPACE, predicate).with_page(page))
    }

    /// Builder preset to this keyspace.
    #[must_use]
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(E::KEYSPACE)
    }

    pub fn execute(&self, query: &Query) -> Result<Page<E>, Error> {
        if query.keyspace != E::KEYSPACE {
            return Err(Error::unsupported_query(
                &query.keyspace,
                format!("repository is bound to '{}'", E::KEYSPACE),
            ));
        }

        self.db.execute(query)?.try_map(E::from_entity)
    }
}

///
/// TESTS
///
