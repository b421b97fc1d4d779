use crate::{KEY_SEPARATOR, MAX_FIELD_PATH_DEPTH, model::KeyspaceModel};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("keyspace '{0}' is declared more than once")]
    DuplicateKeyspace(String),

    #[error("invalid keyspace name '{0}'")]
    InvalidKeyspaceName(String),

    #[error("invalid field path '{path}' in keyspace '{keyspace}'")]
    InvalidFieldPath { keyspace: String, path: String },

    #[error("field '{path}' in keyspace '{keyspace}' is declared both indexed and geo-indexed")]
    ConflictingIndex { keyspace: String, path: String },

    #[error("reference {keyspace}.{field} targets unknown keyspace '{target}'")]
    UnknownReferenceTarget {
        keyspace: String,
        field: String,
        target: String,
    },

    #[error("index path '{path}' in keyspace '{keyspace}' descends through reference '{field}'")]
    IndexThroughReference {
        keyspace: String,
        path: String,
        field: String,
    },

    #[error("failed to read schema file: {0}")]
    Io(String),

    #[error("failed to parse schema: {0}")]
    Parse(String),
}

///
/// SchemaFile
/// On-disk TOML shape: a list of `[[keyspace]]` tables.
///

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    keyspace: Vec<KeyspaceModel>,
}

///
/// Schema
///
/// Validated set of keyspace models, keyed by keyspace name.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    keyspaces: BTreeMap<String, KeyspaceModel>,
}

impl Schema {
    pub fn new(keyspaces: impl IntoIterator<Item = KeyspaceModel>) -> Result<Self, SchemaError> {
        let mut map = BTreeMap::new();
        for model in keyspaces {
            if map.contains_key(&model.name) {
                return Err(SchemaError::DuplicateKeyspace(model.name));
            }
            map.insert(model.name.clone(), model);
        }

        let schema = Self { keyspaces: map };
        schema.validate()?;

        Ok(schema)
    }

    /// Parse a schema from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile =
            toml::from_str(text).map_err(|err| SchemaError::Parse(err.to_string()))?;

        Self::new(file.keyspace)
    }

    /// Load a schema from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path).map_err(|err| SchemaError::Io(err.to_string()))?;

        Self::from_toml_str(&text)
    }

    #[must_use]
    pub fn keyspace(&self, name: &str) -> Option<&KeyspaceModel> {
        self.keyspaces.get(name)
    }

    pub fn keyspaces(&self) -> impl Iterator<Item = &KeyspaceModel> {
        self.keyspaces.values()
    }

    #[must_use]
    pub fn is_indexed(&self, keyspace: &str, path: &str) -> bool {
        self.keyspace(keyspace).is_some_and(|k| k.is_indexed(path))
    }

    #[must_use]
    pub fn is_geo_indexed(&self, keyspace: &str, path: &str) -> bool {
        self.keyspace(keyspace)
            .is_some_and(|k| k.is_geo_indexed(path))
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for model in self.keyspaces.values() {
            if model.name.is_empty() || model.name.contains(KEY_SEPARATOR) {
                return Err(SchemaError::InvalidKeyspaceName(model.name.clone()));
            }

            for path in model.indexes.iter().chain(&model.geo_indexes) {
                validate_path(model, path)?;
            }

            if let Some(path) = model.indexes.iter().find(|p| model.is_geo_indexed(p)) {
                return Err(SchemaError::ConflictingIndex {
                    keyspace: model.name.clone(),
                    path: path.clone(),
                });
            }

            for reference in &model.references {
                if !is_valid_segment(&reference.field) {
                    return Err(SchemaError::InvalidFieldPath {
                        keyspace: model.name.clone(),
                        path: reference.field.clone(),
                    });
                }
                if !self.keyspaces.contains_key(&reference.target) {
                    return Err(SchemaError::UnknownReferenceTarget {
                        keyspace: model.name.clone(),
                        field: reference.field.clone(),
                        target: reference.target.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

// Check one dotted path: bounded depth, non-empty segments, and no descent
// through a reference field.
fn validate_path(model: &KeyspaceModel, path: &str) -> Result<(), SchemaError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() > MAX_FIELD_PATH_DEPTH || !segments.iter().all(|s| is_valid_segment(s)) {
        return Err(SchemaError::InvalidFieldPath {
            keyspace: model.name.clone(),
            path: path.to_string(),
        });
    }

    if segments.len() > 1 && model.reference_for(segments[0]).is_some() {
        return Err(SchemaError::IndexThroughReference {
            keyspace: model.name.clone(),
            path: path.to_string(),
            field: segments[0].to_string(),
        });
    }

    Ok(())
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(KEY_SEPARATOR)
}
