mod cbor;

use thiserror::Error as ThisError;

///
/// Constants
///

/// Upper bound on any encoded payload the core will decode.
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("deserialize error: {0}")]
    Deserialize(String),
}

/// Serialize a value with the storage encoding.
///
/// This helper keeps the error type aligned with the rest of `keydex`.
pub fn serialize<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: serde::Serialize,
{
    cbor::serialize(ty)
}

/// Deserialize a value produced by [`serialize`].
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: serde::de::DeserializeOwned,
{
    cbor::deserialize(bytes)
}
