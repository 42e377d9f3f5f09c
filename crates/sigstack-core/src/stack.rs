//! # Signature Stack
//!
//! Immutable push/pop over a document's `signatures` array. The most recent
//! signature is the last element.
//!
//! Both operations return a new owned document; the input is never mutated
//! and shares no state with the output. The "original" document handed back
//! by verification can therefore be hashed or edited without touching the
//! signed artifact.
//!
//! An empty `signatures` array is never produced: popping the last token
//! removes the field entirely.

use serde_json::{Map, Value};

use crate::error::{kind_of, DocumentError};

/// Name of the field holding the signature tokens.
pub const SIGNATURES_KEY: &str = "signatures";

/// Return a copy of `doc` with `token` appended to its signature stack.
///
/// # Errors
///
/// - [`DocumentError::NotAnObject`] if `doc` is not a JSON object.
/// - [`DocumentError::MalformedSignatures`] if `doc.signatures` exists and
///   is not an array.
pub fn push_signature(doc: &Value, token: &str) -> Result<Value, DocumentError> {
    let map = doc
        .as_object()
        .ok_or_else(|| DocumentError::NotAnObject(kind_of(doc)))?;

    let mut stack = match map.get(SIGNATURES_KEY) {
        None | Some(Value::Null) => Vec::with_capacity(1),
        Some(Value::Array(existing)) => existing.clone(),
        Some(other) => return Err(DocumentError::MalformedSignatures(kind_of(other))),
    };
    stack.push(Value::String(token.to_string()));

    let mut out = without_signatures(map);
    out.insert(SIGNATURES_KEY.to_string(), Value::Array(stack));
    Ok(Value::Object(out))
}

/// Return a copy of `doc` with the most recent signature removed.
///
/// When the stack holds a single token the `signatures` field is removed.
/// A document without a usable stack (not an object, no `signatures`, or
/// `signatures` not an array) is returned unchanged; an empty array is
/// dropped.
pub fn pop_signature(doc: &Value) -> Value {
    let Some(map) = doc.as_object() else {
        return doc.clone();
    };
    let Some(Value::Array(existing)) = map.get(SIGNATURES_KEY) else {
        return doc.clone();
    };

    let mut out = without_signatures(map);
    if existing.len() > 1 {
        let remaining = existing[..existing.len() - 1].to_vec();
        out.insert(SIGNATURES_KEY.to_string(), Value::Array(remaining));
    }
    Value::Object(out)
}

/// The signature tokens of `doc`, oldest first. Empty when absent.
pub fn signatures(doc: &Value) -> &[Value] {
    doc.get(SIGNATURES_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The most recent signature token, if any.
pub fn latest_signature(doc: &Value) -> Option<&Value> {
    signatures(doc).last()
}

/// Number of signatures stacked on `doc`.
pub fn signature_count(doc: &Value) -> usize {
    signatures(doc).len()
}

fn without_signatures(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| k.as_str() != SIGNATURES_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
