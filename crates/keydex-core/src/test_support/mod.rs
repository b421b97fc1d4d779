//! Shared schema, fixtures and typed entities for unit tests.

use crate::{
    db::{Db, backend::MemoryBackend},
    entity::{Entity, EntityKind},
    error::Error,
    model::{KeyspaceModel, Schema},
    types::GeoPoint,
    value::Value,
};
use std::sync::Arc;

pub(crate) const PALERMO: GeoPoint = GeoPoint::new(13.361_389, 38.115_556);
pub(crate) const CATANIA: GeoPoint = GeoPoint::new(15.087_269, 37.502_669);

/// `persons` (names indexed, embedded hometown geo-indexed, `city` reference)
/// and `cities` (name indexed, location geo-indexed).
pub(crate) fn schema() -> Schema {
    Schema::new([
        KeyspaceModel::new("persons")
            .index("firstname")
            .index("lastname")
            .geo_index("hometown.location")
            .reference("city", "cities"),
        KeyspaceModel::new("cities")
            .index("name")
            .geo_index("location"),
    ])
    .expect("test schema is valid")
}

pub(crate) fn db() -> Db {
    Db::new(Arc::new(MemoryBackend::new()), schema())
}

pub(crate) fn person(firstname: &str, lastname: &str) -> Entity {
    Entity::new("persons")
        .with("firstname", firstname)
        .with("lastname", lastname)
}

pub(crate) fn city(name: &str, location: GeoPoint) -> Entity {
    Entity::new("cities")
        .with("name", name)
        .with("location", location)
}

///
/// City
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct City {
    pub(crate) id: Option<String>,
    pub(crate) name: String,
    pub(crate) location: GeoPoint,
}

impl EntityKind for City {
    const KEYSPACE: &'static str = "cities";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn to_entity(&self) -> Entity {
        let entity = city(&self.name, self.location);
        match &self.id {
            Some(id) => entity.with_id(id.as_str()),
            None => entity,
        }
    }

    fn from_entity(entity: Entity) -> Result<Self, Error> {
        let conversion = |message: &str| Error::Conversion {
            keyspace: Self::KEYSPACE.to_string(),
            message: message.to_string(),
        };

        Ok(Self {
            id: entity.id().map(ToString::to_string),
            name: entity
                .text("name")
                .ok_or_else(|| conversion("missing name"))?
                .to_string(),
            location: *entity
                .point("location")
                .ok_or_else(|| conversion("missing location"))?,
        })
    }
}

///
/// Person
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Person {
    pub(crate) id: Option<String>,
    pub(crate) firstname: String,
    pub(crate) lastname: String,
    pub(crate) city: Option<City>,
}

impl Person {
    pub(crate) fn new(firstname: &str, lastname: &str) -> Self {
        Self {
            id: None,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            city: None,
        }
    }
}

impl EntityKind for Person {
    const KEYSPACE: &'static str = "persons";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn to_entity(&self) -> Entity {
        let mut entity = person(&self.firstname, &self.lastname);
        if let Some(city) = &self.city {
            entity.set("city", city.to_entity());
        }
        match &self.id {
            Some(id) => entity.with_id(id.as_str()),
            None => entity,
        }
    }

    fn from_entity(entity: Entity) -> Result<Self, Error> {
        let city = match entity.get("city") {
            Some(Value::Entity(city)) => Some(City::from_entity((**city).clone())?),
            _ => None,
        };

        Ok(Self {
            id: entity.id().map(ToString::to_string),
            firstname: entity.text("firstname").unwrap_or_default().to_string(),
            lastname: entity.text("lastname").unwrap_or_default().to_string(),
            city,
        })
    }
}
