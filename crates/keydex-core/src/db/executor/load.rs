use crate::{
    db::{
        Db,
        executor::exec_log,
        index::IndexManager,
        query::{Predicate, Query, QueryPlan, plan},
        relation::ReferenceResolver,
        response::{IdPage, Page},
        store::{EntityStore, IdSet},
    },
    entity::Entity,
    error::Error,
    model::KeyspaceModel,
    obs::{
        LookupKind, MetricsEvent,
        sink::{ExecKind, Span},
    },
};

///
/// LoadExecutor
///
/// Read side: id lookups and predicate queries.
///
/// Candidate ids come from the indexes only; records are then fetched and
/// their references resolved. Ids are ordered by id, which for generated ids
/// is insertion order.
///

#[derive(Clone, Copy)]
pub struct LoadExecutor<'a> {
    db: &'a Db,
    debug: bool,
}

impl<'a> LoadExecutor<'a> {
    // ======================================================================
    // Construction & configuration
    // ======================================================================

    #[must_use]
    pub const fn new(db: &'a Db, debug: bool) -> Self {
        Self { db, debug }
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    // ======================================================================
    // Id lookups
    // ======================================================================

    /// Exact lookup with references resolved; `None` on a miss.
    pub fn find_by_id(&self, keyspace: &str, id: &str) -> Result<Option<Entity>, Error> {
        self.db.model(keyspace)?;
        let mut span = Span::new(self.db.sink(), ExecKind::Load, keyspace);

        let entity = self
            .store()
            .load(keyspace, id)?
            .map(|entity| self.resolver().resolve(entity))
            .transpose()?;
        span.set_rows(u64::from(entity.is_some()));

        Ok(entity)
    }

    /// Fetch each id in order; missing ids are skipped.
    pub fn find_by_ids<I, S>(&self, keyspace: &str, ids: I) -> Result<Vec<Entity>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.db.model(keyspace)?;
        let mut span = Span::new(self.db.sink(), ExecKind::Load, keyspace);

        let store = self.store();
        let mut out = Vec::new();
        for id in ids {
            if let Some(entity) = store.load(keyspace, id.as_ref())? {
                out.push(entity);
            }
        }
        let out = self.resolver().resolve_all(out)?;
        span.set_rows(out.len() as u64);

        Ok(out)
    }

    pub fn exists(&self, keyspace: &str, id: &str) -> Result<bool, Error> {
        self.db.model(keyspace)?;

        self.store().exists(keyspace, id)
    }

    /// Number of live entities in `keyspace`.
    pub fn count(&self, keyspace: &str) -> Result<u64, Error> {
        self.db.model(keyspace)?;

        Ok(self.members(keyspace)?.len() as u64)
    }

    // ======================================================================
    // Query execution
    // ======================================================================

    /// Matching ids for one page, plus the total before paging.
    pub fn execute_ids(&self, query: &Query) -> Result<IdPage, Error> {
        let plan = plan(self.db.schema(), query)?;

        self.page_ids(&plan)
    }

    /// Matching entities for one page, fetched and resolved.
    pub fn execute(&self, query: &Query) -> Result<Page<Entity>, Error> {
        let plan = plan(self.db.schema(), query)?;
        let keyspace = plan.model.name.as_str();
        let mut span = Span::new(self.db.sink(), ExecKind::Load, keyspace);

        let ids = self.page_ids(&plan)?;
        let entities = self.store().load_many(keyspace, &ids.ids)?;
        let entities = self.resolver().resolve_all(entities)?;
        span.set_rows(entities.len() as u64);

        Ok(Page::new(entities, plan.page, ids.total))
    }

    fn page_ids(&self, plan: &QueryPlan<'_>) -> Result<IdPage, Error> {
        let keyspace = plan.model.name.as_str();
        let matched = match plan.predicate {
            Some(predicate) => self.evaluate(plan.model, predicate)?,
            None => self.members(keyspace)?,
        };

        let total = matched.len() as u64;
        let ids: Vec<String> = match plan.page {
            Some(page) => matched
                .into_iter()
                .skip(page.offset())
                .take(page.size)
                .collect(),
            None => matched.into_iter().collect(),
        };

        exec_log!(
            self.debug,
            keyspace,
            access = %plan.summary(),
            total,
            returned = ids.len(),
            "executed query"
        );

        Ok(IdPage { ids, total })
    }

    // Resolve a predicate to the set of matching ids.
    fn evaluate(&self, model: &KeyspaceModel, predicate: &Predicate) -> Result<IdSet, Error> {
        let indexes = IndexManager::new(self.db.backend(), self.db.sink());
        let keyspace = model.name.as_str();

        match predicate {
            Predicate::Eq { field, value } => indexes.lookup_equality(keyspace, field, value),
            Predicate::Near {
                field,
                center,
                distance,
            } => indexes.lookup_near(keyspace, field, center, distance),
            Predicate::And(children) => {
                let mut children = children.iter();
                let Some(first) = children.next() else {
                    return self.members(keyspace);
                };

                let mut acc = self.evaluate(model, first)?;
                for child in children {
                    if acc.is_empty() {
                        break;
                    }
                    let next = self.evaluate(model, child)?;
                    acc.retain(|id| next.contains(id));
                }

                Ok(acc)
            }
            Predicate::Or(children) => {
                let mut acc = IdSet::new();
                for child in children {
                    acc.extend(self.evaluate(model, child)?);
                }

                Ok(acc)
            }
        }
    }

    // ======================================================================
    // Helpers
    // ======================================================================

    fn members(&self, keyspace: &str) -> Result<IdSet, Error> {
        let ids = self.store().members(keyspace)?;
        self.db.sink().record(MetricsEvent::IndexLookup {
            kind: LookupKind::Members,
            keyspace,
            hits: ids.len() as u64,
        });

        Ok(ids)
    }

    fn store(&self) -> EntityStore<'a> {
        EntityStore::new(self.db.backend())
    }

    fn resolver(&self) -> ReferenceResolver<'a> {
        ReferenceResolver::new(self.store(), self.db.schema(), self.db.sink())
    }
}
