use crate::{
    db::{
        backend::Backend,
        commit::CommitBatch,
        index::{BackRefs, IndexRef, equality_key, equality_prefix, geo_key, geo_prefix},
        store::{IdSet, backref_key, decode, trailing_id},
    },
    entity::Entity,
    error::Error,
    model::KeyspaceModel,
    obs::{LookupKind, MetricsEvent, MetricsSink},
    types::{Distance, GeoPoint},
    value::Value,
};
use std::collections::BTreeMap;

///
/// IndexPlan
///
/// Index deltas for one entity write.
/// `refs` is the complete set of index entries of the entity after the write
/// and becomes its new back-reference set.
///

#[derive(Debug, Default)]
pub(crate) struct IndexPlan {
    pub(crate) remove: Vec<IndexRef>,
    pub(crate) insert: Vec<IndexRef>,
    pub(crate) geo: Vec<(IndexRef, GeoPoint)>,
    pub(crate) refs: BackRefs,
}

impl IndexPlan {
    #[must_use]
    pub(crate) fn inserts(&self) -> u64 {
        (self.insert.len() + self.geo.len()) as u64
    }

    #[must_use]
    pub(crate) fn removes(&self) -> u64 {
        self.remove.len() as u64
    }
}

///
/// IndexManager
///
/// Derives index entries from declared index paths, stages their deltas into
/// the same batch as the entity write, and answers lookups.
///
/// Every entry is its own backend key ending in the entity id, so a write
/// touches only the entries of the entity being written and a lookup is one
/// prefix scan.
///

#[derive(Clone, Copy)]
pub(crate) struct IndexManager<'a> {
    backend: &'a dyn Backend,
    sink: &'a dyn MetricsSink,
}

impl<'a> IndexManager<'a> {
    pub(crate) const fn new(backend: &'a dyn Backend, sink: &'a dyn MetricsSink) -> Self {
        Self { backend, sink }
    }

    // ======================================================================
    // Derivation
    // ======================================================================

    /// Every index entry that `entity` should own under `model`.
    /// Geo refs carry the point to store.
    pub(crate) fn derive(
        model: &KeyspaceModel,
        entity: &Entity,
        id: &str,
    ) -> Result<BTreeMap<IndexRef, Option<GeoPoint>>, Error> {
        let mut out = BTreeMap::new();

        for path in &model.indexes {
            if let Some(token) = entity.get_path(path).and_then(Value::index_token) {
                out.insert(
                    IndexRef::Equality(equality_key(&model.name, path, &token, id)),
                    None,
                );
            }
        }

        for path in &model.geo_indexes {
            match entity.get_path(path) {
                None | Some(Value::Null) => {}
                Some(Value::Point(point)) => {
                    point.validate()?;
                    out.insert(
                        IndexRef::Geo(geo_key(&model.name, path, id)),
                        Some(*point),
                    );
                }
                Some(other) => {
                    return Err(Error::Conversion {
                        keyspace: model.name.clone(),
                        message: format!("geo-indexed field '{path}' must hold a point, got {other:?}"),
                    });
                }
            }
        }

        Ok(out)
    }

    /// Index entries currently owned by the entity.
    ///
    /// The stored back-reference set is authoritative; an entity written
    /// without one falls back to deriving from its old record.
    pub(crate) fn existing_refs(
        batch: &CommitBatch<'_>,
        model: &KeyspaceModel,
        id: &str,
        old: Option<&Entity>,
    ) -> Result<BackRefs, Error> {
        if let Some(refs) = batch.read::<BackRefs>(&backref_key(&model.name, id))? {
            return Ok(refs);
        }

        match old {
            Some(old) => Ok(Self::derive(model, old, id)?.into_keys().collect()),
            None => Ok(BackRefs::default()),
        }
    }

    // ======================================================================
    // Planning
    // ======================================================================

    /// Diff the old index refs against those derived from `new`.
    pub(crate) fn plan_save(
        model: &KeyspaceModel,
        old_refs: &BackRefs,
        new: &Entity,
        id: &str,
    ) -> Result<IndexPlan, Error> {
        let derived = Self::derive(model, new, id)?;
        let mut plan = IndexPlan {
            remove: old_refs
                .iter()
                .filter(|r| !derived.contains_key(r))
                .cloned()
                .collect(),
            ..IndexPlan::default()
        };

        for (index_ref, point) in derived {
            match point {
                // geo coordinates are rewritten on every save
                Some(point) => plan.geo.push((index_ref.clone(), point)),
                None if !old_refs.contains(&index_ref) => plan.insert.push(index_ref.clone()),
                None => {}
            }
            plan.refs.insert(index_ref);
        }

        Ok(plan)
    }

    pub(crate) fn plan_delete(old_refs: BackRefs) -> IndexPlan {
        IndexPlan {
            remove: old_refs.iter().cloned().collect(),
            ..IndexPlan::default()
        }
    }

    // ======================================================================
    // Staging
    // ======================================================================

    /// Stage the plan for entity `id` into `batch`.
    pub(crate) fn stage(
        &self,
        batch: &mut CommitBatch<'_>,
        keyspace: &str,
        id: &str,
        plan: &IndexPlan,
    ) -> Result<(), Error> {
        for index_ref in &plan.remove {
            batch.delete(index_ref.key().to_string());
        }

        for index_ref in &plan.insert {
            batch.put_raw(index_ref.key().to_string(), Vec::new());
        }

        for (index_ref, point) in &plan.geo {
            batch.put(index_ref.key().to_string(), point)?;
        }

        let refs_key = backref_key(keyspace, id);
        if plan.refs.is_empty() {
            batch.delete(refs_key);
        } else {
            batch.put(refs_key, &plan.refs)?;
        }

        self.sink.record(MetricsEvent::IndexDelta {
            keyspace,
            inserts: plan.inserts(),
            removes: plan.removes(),
        });

        Ok(())
    }

    /// Plan and stage the index side of saving `new` over `old_refs`.
    pub(crate) fn on_save(
        &self,
        batch: &mut CommitBatch<'_>,
        model: &KeyspaceModel,
        old_refs: &BackRefs,
        new: &Entity,
        id: &str,
    ) -> Result<IndexPlan, Error> {
        let plan = Self::plan_save(model, old_refs, new, id)?;
        self.stage(batch, &model.name, id, &plan)?;

        Ok(plan)
    }

    /// Stage removal of every index entry owned by entity `id`.
    pub(crate) fn on_delete(
        &self,
        batch: &mut CommitBatch<'_>,
        keyspace: &str,
        id: &str,
        old_refs: BackRefs,
    ) -> Result<IndexPlan, Error> {
        let plan = Self::plan_delete(old_refs);
        self.stage(batch, keyspace, id, &plan)?;

        Ok(plan)
    }

    // ======================================================================
    // Lookups
    // ======================================================================

    /// Ids whose `path` equals `value`; empty when there are none.
    pub(crate) fn lookup_equality(
        &self,
        keyspace: &str,
        path: &str,
        value: &Value,
    ) -> Result<IdSet, Error> {
        let ids: IdSet = match value.index_token() {
            Some(token) => {
                let prefix = equality_prefix(keyspace, path, &token);
                self.backend
                    .scan_prefix(&prefix)?
                    .into_iter()
                    .filter_map(|(key, _)| trailing_id(&prefix, &key))
                    .collect()
            }
            None => IdSet::new(),
        };

        self.sink.record(MetricsEvent::IndexLookup {
            kind: LookupKind::Equality,
            keyspace,
            hits: ids.len() as u64,
        });

        Ok(ids)
    }

    /// Ids whose point at `path` lies within `distance` of `center`
    /// (haversine, boundary included).
    pub(crate) fn lookup_near(
        &self,
        keyspace: &str,
        path: &str,
        center: &GeoPoint,
        distance: &Distance,
    ) -> Result<IdSet, Error> {
        let radius = distance.to_meters();
        let prefix = geo_prefix(keyspace, path);

        let mut ids = IdSet::new();
        for (key, bytes) in self.backend.scan_prefix(&prefix)? {
            // only `prefix` + one escaped id is a geo entry
            let Some(id) = trailing_id(&prefix, &key) else {
                continue;
            };
            let point: GeoPoint = decode(&key, &bytes)?;
            if center.distance_to(&point) <= radius {
                ids.insert(id);
            }
        }

        self.sink.record(MetricsEvent::IndexLookup {
            kind: LookupKind::Near,
            keyspace,
            hits: ids.len() as u64,
        });

        Ok(ids)
    }
}
