use crate::{
    db::{
        Db,
        commit::CommitBatch,
        executor::exec_log,
        index::IndexManager,
        relation::normalize_references,
        store::{EntityStore, encode_record, member_key, record_key},
    },
    entity::Entity,
    error::Error,
    obs::sink::{ExecKind, Span},
    types::id,
};

///
/// SaveExecutor
///
/// Upserts entities by id. Each save commits the record, its index deltas,
/// its back-reference set and its membership marker as one backend batch.
///

#[derive(Clone, Copy)]
pub struct SaveExecutor<'a> {
    db: &'a Db,
    debug: bool,
}

impl<'a> SaveExecutor<'a> {
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
    // Save operations
    // ======================================================================

    /// Insert or replace `entity`, assigning an id when it has none.
    /// Returns the id.
    pub fn save(&self, entity: Entity) -> Result<String, Error> {
        self.save_entity(entity)
    }

    /// Save each entity in order.
    pub fn save_many(
        &self,
        entities: impl IntoIterator<Item = Entity>,
    ) -> Result<Vec<String>, Error> {
        let iter = entities.into_iter();
        let mut out = Vec::with_capacity(iter.size_hint().0);

        // Batch semantics: fail-fast and non-atomic; partial successes remain.
        for entity in iter {
            out.push(self.save(entity)?);
        }

        Ok(out)
    }

    // ======================================================================
    // Low-level execution
    // ======================================================================

    fn save_entity(&self, mut entity: Entity) -> Result<String, Error> {
        let keyspace = entity.keyspace().to_string();
        let model = self.db.model(&keyspace)?;
        let mut span = Span::new(self.db.sink(), ExecKind::Save, &keyspace);

        normalize_references(model, &mut entity)?;
        entity.validate_points()?;

        let id = match entity.id() {
            Some("") => {
                return Err(Error::Conversion {
                    keyspace: keyspace.clone(),
                    message: "entity id must not be empty".to_string(),
                });
            }
            Some(id) => id.to_string(),
            None => id::generate()?,
        };
        entity.assign_id(id.clone());

        let backend = self.db.backend();
        let indexes = IndexManager::new(backend, self.db.sink());

        // writers to one keyspace are serialized from here to commit
        let _guard = self.db.lock(&keyspace)?;

        let old = EntityStore::new(backend).load(&keyspace, &id)?;
        let mut batch = CommitBatch::new(backend);
        let old_refs = IndexManager::existing_refs(&batch, model, &id, old.as_ref())?;
        let plan = indexes.on_save(&mut batch, model, &old_refs, &entity, &id)?;

        batch.put_raw(record_key(&keyspace, &id), encode_record(&entity)?);
        batch.put_raw(member_key(&keyspace, &id), Vec::new());

        let writes = batch.commit()?;
        span.set_rows(1);

        exec_log!(
            self.debug,
            keyspace = keyspace.as_str(),
            id = id.as_str(),
            created = old.is_none(),
            index_inserts = plan.inserts(),
            index_removes = plan.removes(),
            writes,
            "saved entity"
        );

        Ok(id)
    }
}
