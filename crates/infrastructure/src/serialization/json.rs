//! JSON helpers

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// A value could not be written as JSON.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Input was not valid JSON for the target type.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The serializer produced invalid UTF-8.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json_stable<T: Serialize + ?Sized>(value: &T) -> Result<String, SerializationError> {
    let bytes = to_json_stable_bytes(value)?;
    Ok(String::from_utf8(bytes)?)
}

/// Same layout as [`to_json_stable`], as bytes ready to write to disk.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json_stable_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(SerializationError::Serialize)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Deserializes JSON bytes, pretty or minified.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON for `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}
