use crate::{
    db::{
        Db,
        commit::CommitBatch,
        executor::exec_log,
        index::IndexManager,
        store::{EntityStore, keyspace_prefix, member_key, record_key},
    },
    error::Error,
    obs::sink::{ExecKind, Span},
};

///
/// DeleteExecutor
///
/// Removes entities together with every index entry that references them.
/// Deleting an absent id is a no-op, never an error.
///

#[derive(Clone, Copy)]
pub struct DeleteExecutor<'a> {
    db: &'a Db,
    debug: bool,
}

impl<'a> DeleteExecutor<'a> {
    #[must_use]
    pub const fn new(db: &'a Db, debug: bool) -> Self {
        Self { db, debug }
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Delete one entity; returns whether a record was removed.
    pub fn delete_by_id(&self, keyspace: &str, id: &str) -> Result<bool, Error> {
        let model = self.db.model(keyspace)?;
        let mut span = Span::new(self.db.sink(), ExecKind::Delete, keyspace);

        let backend = self.db.backend();
        let indexes = IndexManager::new(backend, self.db.sink());
        let _guard = self.db.lock(keyspace)?;

        let old = EntityStore::new(backend).load(keyspace, id)?;
        let mut batch = CommitBatch::new(backend);
        let old_refs = IndexManager::existing_refs(&batch, model, id, old.as_ref())?;

        // leftover back-references without a record are still cleaned up
        if old.is_none() && old_refs.is_empty() {
            exec_log!(self.debug, keyspace, id, "delete of absent entity");
            return Ok(false);
        }

        let plan = indexes.on_delete(&mut batch, keyspace, id, old_refs)?;
        batch.delete(record_key(keyspace, id));

        batch.delete(member_key(keyspace, id));

        batch.commit()?;

        let removed = old.is_some();
        span.set_rows(u64::from(removed));
        exec_log!(
            self.debug,
            keyspace,
            id,
            index_removes = plan.removes(),
            "deleted entity"
        );

        Ok(removed)
    }

    /// Remove every entity of `keyspace` and all of its index entries.
    /// Returns the number of entities removed.
    pub fn delete_all(&self, keyspace: &str) -> Result<u64, Error> {
        self.db.model(keyspace)?;
        let mut span = Span::new(self.db.sink(), ExecKind::Flush, keyspace);

        let backend = self.db.backend();
        let _guard = self.db.lock(keyspace)?;

        let members = EntityStore::new(backend).members(keyspace)?;
        let keys = backend.scan_prefix(&keyspace_prefix(keyspace))?;

        let mut batch = CommitBatch::new(backend);
        for (key, _) in keys {
            batch.delete(key);
        }
        let writes = batch.commit()?;

        let removed = members.len() as u64;
        span.set_rows(removed);
        exec_log!(self.debug, keyspace, removed, writes, "flushed keyspace");

        Ok(removed)
    }
}
