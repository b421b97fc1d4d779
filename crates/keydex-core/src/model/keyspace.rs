use serde::{Deserialize, Serialize};

///
/// ReferenceModel
/// A field holding the id of an entity in `target`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReferenceModel {
    pub field: String,
    pub target: String,
}

///
/// KeyspaceModel
///
/// Runtime descriptor for one keyspace.
/// Paths in `indexes` and `geo_indexes` may be dotted (`hometown.location`).
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyspaceModel {
    pub name: String,
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(default)]
    pub geo_indexes: Vec<String>,
    #[serde(default)]
    pub references: Vec<ReferenceModel>,
}

impl KeyspaceModel {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn index(mut self, path: impl Into<String>) -> Self {
        self.indexes.push(path.into());
        self
    }

    #[must_use]
    pub fn geo_index(mut self, path: impl Into<String>) -> Self {
        self.geo_indexes.push(path.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, field: impl Into<String>, target: impl Into<String>) -> Self {
        self.references.push(ReferenceModel {
            field: field.into(),
            target: target.into(),
        });
        self
    }

    #[must_use]
    pub fn is_indexed(&self, path: &str) -> bool {
        self.indexes.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn is_geo_indexed(&self, path: &str) -> bool {
        self.geo_indexes.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn reference_for(&self, field: &str) -> Option<&ReferenceModel> {
        self.references.iter().find(|r| r.field == field)
    }
}
