
use crate::{entity::Entity, types::GeoPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Value
///
/// Dynamic field value carried by an [`Entity`].
///
/// - `Ref` holds the id of an entity in another keyspace; it is what reference
///   fields are persisted as.
/// - `Entity` appears in two places: embedded sub-entities stored inline, and
///   reference fields after read-time resolution.
/// - `Embedded` is an anonymous nested field map.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Point(GeoPoint),
    Ref(String),
    Embedded(BTreeMap<String, Self>),
    Entity(Box<Entity>),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_point(&self) -> Option<&GeoPoint> {
        match self {
            Self::Point(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Id of the entity this value points at, if it is reference-shaped.
    #[must_use]
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            Self::Ref(id) => Some(id),
            Self::Entity(e) => e.id(),
            _ => None,
        }
    }

    /// Canonical text form used as the equality-index token.
    ///
    /// Values are compared by this form, so `Int(1)`, `Float(1.0)` and
    /// `Text("1")` share one index entry. Values with no token are never
    /// indexed for equality.
    #[must_use]
    pub fn index_token(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) if f.is_finite() => {
                // fold -0.0 into 0.0
                let f = if *f == 0.0 { 0.0 } else { *f };
                Some(f.to_string())
            }
            Self::Text(s) => Some(s.clone()),
            Self::Ref(_) | Self::Entity(_) => self.reference_id().map(ToString::to_string),
            Self::Null | Self::Float(_) | Self::Point(_) | Self::Embedded(_) => None,
        }
    }

    /// Look up a child field of an embedded value.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Embedded(fields) => fields.get(name),
            Self::Entity(e) => e.get(name),
            _ => None,
        }
    }

    /// Visit every geo point held by this value, recursing into embedded values.
    pub fn for_each_point(&self, f: &mut impl FnMut(&GeoPoint)) {
        match self {
            Self::Point(p) => f(p),
            Self::Embedded(fields) => fields.values().for_each(|v| v.for_each_point(f)),
            Self::Entity(e) => e.fields().values().for_each(|v| v.for_each_point(f)),
            _ => {}
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<GeoPoint> for Value {
    fn from(p: GeoPoint) -> Self {
        Self::Point(p)
    }
}

impl From<Entity> for Value {
    fn from(e: Entity) -> Self {
        Self::Entity(Box::new(e))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
