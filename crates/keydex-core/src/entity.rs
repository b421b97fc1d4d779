use crate::{MAX_FIELD_PATH_DEPTH, error::Error, types::GeoPoint, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Entity
///
/// A record of one keyspace: an optional id (assigned on first save) and a
/// field map. Field names are plain segments; nested values are reached with
/// dotted paths through [`Value::Embedded`] and embedded [`Value::Entity`].
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Entity {
    keyspace: String,
    id: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Entity {
    #[must_use]
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            id: None,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub(crate) const fn from_parts(
        keyspace: String,
        id: String,
        fields: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            keyspace,
            id: Some(id),
            fields,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    #[must_use]
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.fields
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolve a dotted path such as `hometown.location`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.').take(MAX_FIELD_PATH_DEPTH);
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.child(segment)?;
        }

        Some(current)
    }

    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    #[must_use]
    pub fn point(&self, field: &str) -> Option<&GeoPoint> {
        self.get(field).and_then(Value::as_point)
    }

    #[must_use]
    pub fn entity(&self, field: &str) -> Option<&Self> {
        self.get(field).and_then(Value::as_entity)
    }

    /// Check every point in the field map against the coordinate ranges.
    pub(crate) fn validate_points(&self) -> Result<(), Error> {
        let mut first_invalid = None;
        for value in self.fields.values() {
            value.for_each_point(&mut |p| {
                if first_invalid.is_none() && !p.is_valid() {
                    first_invalid = Some(*p);
                }
            });
        }

        match first_invalid {
            Some(p) => p.validate(),
            None => Ok(()),
        }
    }
}

///
/// EntityKind
///
/// Typed view of one keyspace, used by [`Repository`](crate::db::repository::Repository).
/// Implementations map a domain struct to and from the dynamic [`Entity`].
///

pub trait EntityKind: Sized {
    const KEYSPACE: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    fn to_entity(&self) -> Entity;

    fn from_entity(entity: Entity) -> Result<Self, Error>;
}

///
/// TESTS
///
