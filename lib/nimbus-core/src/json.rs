//! JSON encoding helpers shared by requests, responses and pages.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::Result;

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use nimbus_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Vpc { name: String }
///
/// let vpc = Vpc { name: "web".to_string() };
/// let bytes = to_json(&vpc).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"web"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// Failures report the path of the offending field (e.g. `vpcs[1].name`).
///
/// # Errors
///
/// Returns [`crate::Error::JsonDeserialization`] if decoding fails.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize an already-decoded JSON value with path-aware error messages.
///
/// `prefix` is prepended to the reported path, so an item decoded out of a
/// page collection reports `servers[2].id` rather than `[2].id`.
///
/// # Errors
///
/// Returns [`crate::Error::JsonDeserialization`] if decoding fails.
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value, prefix: &str) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        let path = match (prefix.is_empty(), path.as_str()) {
            (true, _) => path,
            (false, ".") => prefix.to_string(),
            (false, p) if p.starts_with('[') => format!("{prefix}{p}"),
            (false, p) => format!("{prefix}.{p}"),
        };
        crate::Error::json_deserialization(path, e.inner().to_string())
    })
}
