//! Reference fields: normalized to ids on write, resolved one level deep on read.

use crate::{
    db::store::EntityStore,
    entity::Entity,
    error::Error,
    model::{KeyspaceModel, Schema},
    obs::{MetricsEvent, MetricsSink},
    value::Value,
};

///
/// ReferenceResolver
///
/// Replaces each declared reference id with the referenced entity.
/// A missing referent resolves to `Value::Null`; referents keep their own
/// references as ids.
///

#[derive(Clone, Copy)]
pub(crate) struct ReferenceResolver<'a> {
    store: EntityStore<'a>,
    schema: &'a Schema,
    sink: &'a dyn MetricsSink,
}

impl<'a> ReferenceResolver<'a> {
    pub(crate) const fn new(
        store: EntityStore<'a>,
        schema: &'a Schema,
        sink: &'a dyn MetricsSink,
    ) -> Self {
        Self {
            store,
            schema,
            sink,
        }
    }

    pub(crate) fn resolve(&self, mut entity: Entity) -> Result<Entity, Error> {
        let Some(model) = self.schema.keyspace(entity.keyspace()) else {
            return Ok(entity);
        };

        for reference in &model.references {
            let Some(Value::Ref(id)) = entity.get(&reference.field) else {
                continue;
            };

            let resolved = match self.store.load(&reference.target, id)? {
                Some(target) => Value::Entity(Box::new(target)),
                None => {
                    self.sink.record(MetricsEvent::ReferenceMiss {
                        keyspace: &model.name,
                        field: &reference.field,
                    });
                    Value::Null
                }
            };
            entity.set(reference.field.as_str(), resolved);
        }

        Ok(entity)
    }

    pub(crate) fn resolve_all(&self, entities: Vec<Entity>) -> Result<Vec<Entity>, Error> {
        entities.into_iter().map(|e| self.resolve(e)).collect()
    }
}

/// Rewrite every declared reference field of `entity` to `Value::Ref`.
///
/// Accepts an id (`Ref` or `Text`) or a saved entity of the target keyspace.
/// Null and absent fields are left alone.
pub(crate) fn normalize_references(
    model: &KeyspaceModel,
    entity: &mut Entity,
) -> Result<(), Error> {
    for reference in &model.references {
        let field = reference.field.as_str();
        let Some(value) = entity.fields_mut().get_mut(field) else {
            continue;
        };

        let id = match value {
            Value::Null | Value::Ref(_) => continue,
            Value::Text(id) => std::mem::take(id),
            Value::Entity(target) => {
                if target.keyspace() != reference.target {
                    return Err(Error::invalid_reference(
                        &model.name,
                        field,
                        format!(
                            "expected an entity of '{}', got '{}'",
                            reference.target,
                            target.keyspace()
                        ),
                    ));
                }
                match target.id() {
                    Some(id) => id.to_string(),
                    None => {
                        return Err(Error::invalid_reference(
                            &model.name,
                            field,
                            "referenced entity has not been saved",
                        ));
                    }
                }
            }
            other => {
                return Err(Error::invalid_reference(
                    &model.name,
                    field,
                    format!("expected an id or entity, got {other:?}"),
                ));
            }
        };

        if id.is_empty() {
            return Err(Error::invalid_reference(&model.name, field, "empty id"));
        }
        *value = Value::Ref(id);
    }

    Ok(())
}

///
/// TESTS
///
