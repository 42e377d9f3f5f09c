//! # Canonical Serialization: Hashing Input Production
//!
//! This module defines `CanonicalString`, the sole construction path for text
//! used in document hashing across sigstack.
//!
//! ## Rules
//!
//! Applied recursively, with no whitespace anywhere:
//!
//! 1. `null` → `null`, booleans → `true` / `false`.
//! 2. Strings → wrapped in double quotes, text emitted verbatim. Embedded
//!    quotes and control characters are **not** escaped. Every signature
//!    already in circulation was hashed this way, so changing it would break
//!    verification of existing documents.
//! 3. Numbers → decimal text. Integers print as-is. Floats print the way
//!    ECMAScript's `Number#toString` does: `1.0` → `1`, `1e21` → `1e+21`,
//!    `1e-7` → `1e-7`, `0.000001` → `0.000001`. Any number whose text
//!    contains a `.` is accepted but logged, since that form is not portable
//!    across number implementations.
//! 4. Arrays → elements in original order.
//! 5. Objects → keys sorted by byte order, emitted as `"key":value`.
//!
//! This is not RFC 8785. It is a minimal, self-consistent scheme: signer and
//! verifier produce identical bytes as long as both apply these rules.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Text produced exclusively by the canonical serializer.
///
/// # Invariants
///
/// - Constructed only through [`CanonicalString::new()`] or
///   [`CanonicalString::from_value()`].
/// - Object keys appear in byte order at every nesting level.
/// - Contains no insignificant whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalString(String);

impl CanonicalString {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as a JSON value tree (for example a map with
    /// non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Ok(Self::from_value(&value))
    }

    /// Canonicalize an existing JSON value. Total: every `Value` has a
    /// canonical form.
    pub fn from_value(value: &Value) -> Self {
        let mut out = String::new();
        write_value(value, &mut out);
        Self(out)
    }

    /// Access the canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Access the canonical text as UTF-8 bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the length of the canonical text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical text is empty. Never true for output of
    /// the serializer; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the canonical text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalString {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize a JSON value into its canonical text form.
///
/// Convenience wrapper around [`CanonicalString::from_value()`].
pub fn serialize(value: &Value) -> String {
    CanonicalString::from_value(value).into_string()
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // serde_json::Map is only sorted without `preserve_order`; sort
            // explicitly so feature unification elsewhere cannot change output.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(item, out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    out.push_str(s);
    out.push('"');
}

fn write_number(n: &Number, out: &mut String) {
    if n.is_i64() || n.is_u64() {
        out.push_str(&n.to_string());
        return;
    }
    let Some(f) = n.as_f64() else {
        out.push_str(&n.to_string());
        return;
    };
    let text = format_float(f);
    if text.contains('.') {
        tracing::warn!(
            value = f,
            "fractional number in hashed document; its text form is not portable \
             across number implementations, use a string instead"
        );
    }
    out.push_str(&text);
}

/// ECMAScript `Number#toString` for a finite float.
///
/// With `digits` the shortest round-trip significand (`k` digits) and `n`
/// the decimal exponent such that the value is `0.digits × 10^n`:
/// plain integers up to 21 digits, plain decimals down to `1e-6`, and
/// `d.ddde±x` outside that range.
fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    // `{:e}` yields the shortest round-trip significand, e.g. `1.5e-7`.
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{}", exp.abs())
    };

    if f.is_sign_negative() {
        format!("-{body}")
    } else {
        body
    }
}
