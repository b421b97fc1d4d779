#![allow(dead_code)]

use keydex_core::{
    db::backend::{Backend, MemoryBackend},
    error::Error,
    prelude::*,
};
use std::sync::Arc;

pub const SCHEMA: &str = r#"
[[keyspace]]
name = "persons"
indexes = ["firstname", "lastname"]
geo_indexes = ["hometown.location"]
references = [{ field = "city", target = "cities" }]

[[keyspace]]
name = "cities"
indexes = ["name"]
geo_indexes = ["location"]
"#;

pub const PALERMO: GeoPoint = GeoPoint::new(13.361_389, 38.115_556);
pub const CATANIA: GeoPoint = GeoPoint::new(15.087_269, 37.502_669);

pub fn schema() -> Schema {
    Schema::from_toml_str(SCHEMA).unwrap()
}

pub fn db() -> Db {
    Db::new(Arc::new(MemoryBackend::new()), schema())
}

pub fn db_on(backend: Arc<dyn Backend>) -> Db {
    Db::new(backend, schema())
}

///
/// City
///

#[derive(Clone, Debug, PartialEq)]
pub struct City {
    pub id: Option<String>,
    pub name: String,
    pub location: GeoPoint,
}

impl City {
    pub fn new(name: &str, location: GeoPoint) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            location,
        }
    }
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
        let entity = Entity::new(Self::KEYSPACE)
            .with("name", self.name.as_str())
            .with("location", self.location);
        match &self.id {
            Some(id) => entity.with_id(id.as_str()),
            None => entity,
        }
    }

    fn from_entity(entity: Entity) -> Result<Self, Error> {
        Ok(Self {
            id: entity.id().map(ToString::to_string),
            name: entity.text("name").unwrap_or_default().to_string(),
            location: entity
                .point("location")
                .copied()
                .ok_or_else(|| Error::Conversion {
                    keyspace: Self::KEYSPACE.to_string(),
                    message: "missing location".to_string(),
                })?,
        })
    }
}

///
/// Person
///
/// `hometown` is embedded inline; `city` is a reference resolved on read.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub id: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub hometown: Option<City>,
    pub city: Option<City>,
}

impl Person {
    pub fn new(firstname: &str, lastname: &str) -> Self {
        Self {
            id: None,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            hometown: None,
            city: None,
        }
    }

    pub fn with_hometown(mut self, city: City) -> Self {
        self.hometown = Some(city);
        self
    }

    pub fn with_city(mut self, city: City) -> Self {
        self.city = Some(city);
        self
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
        let mut entity = Entity::new(Self::KEYSPACE)
            .with("firstname", self.firstname.as_str())
            .with("lastname", self.lastname.as_str());
        if let Some(hometown) = &self.hometown {
            entity.set("hometown", hometown.to_entity());
        }
        if let Some(city) = &self.city {
            entity.set("city", city.to_entity());
        }
        match &self.id {
            Some(id) => entity.with_id(id.as_str()),
            None => entity,
        }
    }

    fn from_entity(entity: Entity) -> Result<Self, Error> {
        let nested = |field: &str| {
            entity
                .entity(field)
                .cloned()
                .map(City::from_entity)
                .transpose()
        };

        Ok(Self {
            id: entity.id().map(ToString::to_string),
            firstname: entity.text("firstname").unwrap_or_default().to_string(),
            lastname: entity.text("lastname").unwrap_or_default().to_string(),
            hometown: nested("hometown")?,
            city: nested("city")?,
        })
    }
}
