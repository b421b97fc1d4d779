use crate::{db::backend::BackendError, model::SchemaError, serialize::SerializeError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure the core surfaces to its callers.
/// A missing entity is never an error; lookups return `Option` instead.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unsupported query on '{keyspace}': {reason}")]
    UnsupportedQuery { keyspace: String, reason: String },

    #[error("backing store unavailable: {0}")]
    StoreUnavailable(#[from] BackendError),

    #[error("invalid geo coordinate: longitude={longitude}, latitude={latitude}")]
    InvalidGeoCoordinate { longitude: f64, latitude: f64 },

    #[error("keyspace '{0}' is not declared in the schema")]
    UnknownKeyspace(String),

    #[error("invalid reference {keyspace}.{field}: {reason}")]
    InvalidReference {
        keyspace: String,
        field: String,
        reason: String,
    },

    #[error("cannot convert entity of '{keyspace}': {message}")]
    Conversion { keyspace: String, message: String },

    #[error("corrupt value at '{key}': {message}")]
    Corruption { key: String, message: String },

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("id generation failed: {0}")]
    IdGeneration(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl Error {
    pub(crate) fn unsupported_query(keyspace: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedQuery {
            keyspace: keyspace.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_reference(
        keyspace: &str,
        field: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidReference {
            keyspace: keyspace.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corruption(key: &str, message: impl fmt::Display) -> Self {
        Self::Corruption {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedQuery { .. } => ErrorClass::Unsupported,
            Self::StoreUnavailable(_) => ErrorClass::Unavailable,
            Self::InvalidGeoCoordinate { .. }
            | Self::UnknownKeyspace(_)
            | Self::InvalidReference { .. }
            | Self::Conversion { .. } => ErrorClass::InvalidInput,
            Self::Corruption { .. } => ErrorClass::Corruption,
            Self::Serialize(_) | Self::Schema(_) | Self::IdGeneration(_) | Self::LockPoisoned(_) => {
                ErrorClass::Internal
            }
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::UnsupportedQuery { .. } => ErrorOrigin::Query,
            Self::StoreUnavailable(_) | Self::Corruption { .. } | Self::LockPoisoned(_) => {
                ErrorOrigin::Store
            }
            Self::InvalidGeoCoordinate { .. } => ErrorOrigin::Index,
            Self::InvalidReference { .. } => ErrorOrigin::Relation,
            Self::UnknownKeyspace(_) | Self::Schema(_) => ErrorOrigin::Schema,
            Self::Conversion { .. } => ErrorOrigin::Interface,
            Self::Serialize(_) => ErrorOrigin::Serialize,
            Self::IdGeneration(_) => ErrorOrigin::Executor,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    Internal,
    InvalidInput,
    Unavailable,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::InvalidInput => "invalid_input",
            Self::Unavailable => "unavailable",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Executor,
    Index,
    Interface,
    Query,
    Relation,
    Schema,
    Serialize,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Executor => "executor",
            Self::Index => "index",
            Self::Interface => "interface",
            Self::Query => "query",
            Self::Relation => "relation",
            Self::Schema => "schema",
            Self::Serialize => "serialize",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
