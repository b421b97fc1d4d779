//! Storage engine: backend access, secondary indexes, queries and the typed
//! repository layer, fronted by [`Db`].

pub mod backend;
pub(crate) mod commit;
pub mod executor;
pub mod index;
pub mod query;
pub(crate) mod relation;
pub mod repository;
pub mod response;
pub mod store;

use crate::{
    db::{
        backend::Backend,
        executor::{DeleteExecutor, LoadExecutor, SaveExecutor},
        query::Query,
        repository::Repository,
        response::{IdPage, Page, PageRequest},
    },
    entity::{Entity, EntityKind},
    error::Error,
    model::{KeyspaceModel, Schema},
    obs::{MetricsSink, TracingSink},
};
use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

///
/// Db
///
/// Handle to one backing store plus the schema it is indexed by.
///
/// Writers to a keyspace serialize on that keyspace's lock; readers never
/// take it. Share a `Db` across threads with `Arc`.
///

pub struct Db {
    backend: Arc<dyn Backend>,
    schema: Arc<Schema>,
    locks: BTreeMap<String, Mutex<()>>,
    sink: Arc<dyn MetricsSink>,
    debug: bool,
}

impl Db {
    // ======================================================================
    // Construction & configuration
    // ======================================================================

    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, schema: impl Into<Arc<Schema>>) -> Self {
        let schema = schema.into();
        let locks = schema
            .keyspaces()
            .map(|model| (model.name.clone(), Mutex::new(())))
            .collect();

        Self {
            backend,
            schema,
            locks,
            sink: Arc::new(TracingSink),
            debug: false,
        }
    }

    /// Route metrics events to `sink` instead of `tracing`.
    #[must_use]
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Enable debug-level lifecycle logging for every executor of this handle.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub(crate) fn sink(&self) -> &dyn MetricsSink {
        self.sink.as_ref()
    }

    pub(crate) fn model(&self, keyspace: &str) -> Result<&KeyspaceModel, Error> {
        self.schema
            .keyspace(keyspace)
            .ok_or_else(|| Error::UnknownKeyspace(keyspace.to_string()))
    }

    pub(crate) fn lock(&self, keyspace: &str) -> Result<MutexGuard<'_, ()>, Error> {
        self.locks
            .get(keyspace)
            .ok_or_else(|| Error::UnknownKeyspace(keyspace.to_string()))?
            .lock()
            .map_err(|_| Error::LockPoisoned(format!("keyspace '{keyspace}'")))
    }

    // ======================================================================
    // Low-level executors
    // ======================================================================

    #[must_use]
    pub const fn load(&self) -> LoadExecutor<'_> {
        LoadExecutor::new(self, self.debug)
    }

    #[must_use]
    pub const fn save_executor(&self) -> SaveExecutor<'_> {
        SaveExecutor::new(self, self.debug)
    }

    #[must_use]
    pub const fn delete(&self) -> DeleteExecutor<'_> {
        DeleteExecutor::new(self, self.debug)
    }

    /// Typed access to the keyspace of `E`.
    #[must_use]
    pub const fn repository<E: EntityKind>(&self) -> Repository<'_, E> {
        Repository::new(self)
    }

    // ======================================================================
    // Writes
    // ======================================================================

    /// Insert or replace `entity`; returns its id, generated when absent.
    pub fn save(&self, entity: Entity) -> Result<String, Error> {
        self.save_executor().save(entity)
    }

    /// Save each entity in order, stopping at the first failure.
    /// Entities saved before the failure stay saved.
    pub fn save_many(
        &self,
        entities: impl IntoIterator<Item = Entity>,
    ) -> Result<Vec<String>, Error> {
        self.save_executor().save_many(entities)
    }

    /// Delete one entity; deleting an absent id succeeds.
    pub fn delete_by_id(&self, keyspace: &str, id: &str) -> Result<bool, Error> {
        self.delete().delete_by_id(keyspace, id)
    }

    /// Delete every entity of `keyspace` and its indexes.
    pub fn delete_all(&self, keyspace: &str) -> Result<u64, Error> {
        self.delete().delete_all(keyspace)
    }

    // ======================================================================
    // Reads
    // ======================================================================

    pub fn find_by_id(&self, keyspace: &str, id: &str) -> Result<Option<Entity>, Error> {
        self.load().find_by_id(keyspace, id)
    }

    pub fn find_by_ids<I, S>(&self, keyspace: &str, ids: I) -> Result<Vec<Entity>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.load().find_by_ids(keyspace, ids)
    }

    pub fn exists(&self, keyspace: &str, id: &str) -> Result<bool, Error> {
        self.load().exists(keyspace, id)
    }

    pub fn count(&self, keyspace: &str) -> Result<u64, Error> {
        self.load().count(keyspace)
    }

    /// Every live entity, optionally paged.
    pub fn find_all(
        &self,
        keyspace: &str,
        page: Option<PageRequest>,
    ) -> Result<Page<Entity>, Error> {
        let mut query = Query::all(keyspace);
        query.page = page;

        self.execute(&query)
    }

    pub fn execute(&self, query: &Query) -> Result<Page<Entity>, Error> {
        self.load().execute(query)
    }

    pub fn execute_ids(&self, query: &Query) -> Result<IdPage, Error> {
        self.load().execute_ids(query)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("schema", &self.schema)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
