//! # Error Types
//!
//! Errors raised by the canonical serializer and the signature stack. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value could not be converted into a JSON value tree (non-string
    /// map keys, non-finite floats, failing `Serialize` impls).
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error while manipulating a document's signature stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Signatures can only be attached to JSON objects.
    #[error("document must be a JSON object to carry signatures, got {0}")]
    NotAnObject(&'static str),

    /// The existing `signatures` field is not an array.
    #[error("`signatures` must be an array, got {0}")]
    MalformedSignatures(&'static str),
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
