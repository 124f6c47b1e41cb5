//! Free-form `notes` post-processing.
//!
//! Services store `notes` as arbitrary JSON and hand it back as a generic
//! tree. Façade DTOs expose it as a canonical JSON string instead, so that two
//! fetches of the same notes compare equal and a fetched resource can be
//! re-submitted unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Re-encodes a `notes` tree as a canonical JSON string.
///
/// Objects are written with sorted keys and no insignificant whitespace. A
/// value that already is a string is passed through; `null` is `None`.
pub fn canonical_notes(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Serde adapter for `Option<String>` notes fields.
///
/// Use with `#[serde(default, with = "protocol::notes::as_json_string")]`.
/// Decoding accepts any JSON value and canonicalises it. Encoding sends a
/// string that holds a JSON object or array as that structure; anything
/// else, including text that merely looks like a number or boolean, stays a
/// string.
pub mod as_json_string {
    use super::*;

    /// Decodes any JSON value into its canonical string form.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(canonical_notes))
    }

    /// Encodes a notes string as the object or array it contains, or as a
    /// plain string otherwise.
    pub fn serialize<S>(notes: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match notes {
            None => serializer.serialize_none(),
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(value @ (Value::Object(_) | Value::Array(_))) => value.serialize(serializer),
                _ => serializer.serialize_str(text),
            },
        }
    }
}
