//! The `{status, message, version, result}` response envelope.
//!
//! Every backend endpoint answers with this wrapper on both success and
//! failure. `result` is opaque here: it is held as a [`serde_json::Value`]
//! tree and only converted to a concrete type when a caller asks for one.
//! Decoding a body is therefore a two-pass conversion: bytes to a generic
//! tree, then tree to the caller's `T`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ClientError, TransportError};

/// The wire envelope.
///
/// All fields are optional on decode. On encode all four keys are always
/// written, with `null` for absent values, so the wire shape is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Status vocabulary word, e.g. `"success"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Server build / protocol version.
    #[serde(default)]
    pub version: Option<String>,
    /// Endpoint-specific payload.
    #[serde(default)]
    pub result: Option<Value>,
}

impl ResponseEnvelope {
    /// Builds a `"success"` envelope around `result`.
    pub fn success(message: impl Into<String>, version: impl Into<String>, result: Option<Value>) -> Self {
        Self {
            status: Some("success".to_owned()),
            message: Some(message.into()),
            version: Some(version.into()),
            result,
        }
    }

    /// Decodes a successful response body.
    ///
    /// A blank body yields `Ok(None)`: the call succeeded but returned no
    /// envelope at all.
    pub fn from_body(body: &str) -> Result<Option<Self>, TransportError> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(body)
            .map(Some)
            .map_err(TransportError::Decode)
    }

    /// Returns the raw `result` tree, treating an explicit `null` as absent.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref().filter(|value| !value.is_null())
    }

    /// Converts `result` into `T`.
    ///
    /// An absent or `null` result is `Ok(None)`; emptiness is a normal
    /// successful outcome. A result that does not fit `T` is a client-side
    /// decode failure.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<Option<T>, ClientError> {
        match self.result {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ClientError::normalize(TransportError::Decode(e))),
        }
    }

    /// Converts a list `result` into `Vec<T>`; absent or `null` is empty.
    pub fn into_list<T: DeserializeOwned>(self) -> Result<Vec<T>, ClientError> {
        Ok(self.into_result::<Vec<T>>()?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        size: u32,
    }

    #[test]
    fn encode_writes_all_four_keys() {
        let encoded = serde_json::to_value(ResponseEnvelope::default()).expect("encode");
        assert_eq!(
            encoded,
            json!({"status": null, "message": null, "version": null, "result": null})
        );
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let body = r#"{"status":"success","message":"ok","version":"1.0","result":{"id":"a","size":1},"metadata":{"totalCount":1}}"#;
        let envelope = ResponseEnvelope::from_body(body).expect("decode").expect("present");
        let item: Option<Item> = envelope.into_result().expect("typed");
        assert_eq!(item, Some(Item { id: "a".to_owned(), size: 1 }));
    }

    #[test]
    fn typed_round_trip_reproduces_value() {
        let original = vec![Item { id: "x".to_owned(), size: 9 }, Item { id: "y".to_owned(), size: 0 }];
        let envelope = ResponseEnvelope::success(
            "ok",
            "1",
            Some(serde_json::to_value(&original).expect("encode")),
        );
        let body = serde_json::to_string(&envelope).expect("encode");
        let decoded = ResponseEnvelope::from_body(&body).expect("decode").expect("present");
        assert_eq!(decoded.into_list::<Item>().expect("typed"), original);
    }

    #[test]
    fn null_and_missing_result_are_empty() {
        let null = ResponseEnvelope::from_body(r#"{"status":"success","result":null}"#)
            .expect("decode")
            .expect("present");
        assert_eq!(null.result(), None);
        assert_eq!(null.clone().into_result::<Item>().expect("typed"), None);
        assert!(null.into_list::<Item>().expect("typed").is_empty());

        let missing = ResponseEnvelope::from_body(r#"{"status":"success"}"#)
            .expect("decode")
            .expect("present");
        assert!(missing.into_list::<String>().expect("typed").is_empty());
    }

    #[test]
    fn blank_body_is_absent_envelope() {
        assert_eq!(ResponseEnvelope::from_body("  \n").expect("decode"), None);
    }

    #[test]
    fn malformed_body_is_decode_failure() {
        let error = ResponseEnvelope::from_body("not json").expect_err("should fail");
        assert!(matches!(error, TransportError::Decode(_)));
    }

    #[test]
    fn mismatched_result_is_client_error_with_sentinel_code() {
        let envelope = ResponseEnvelope::success("ok", "1", Some(json!("not an item")));
        let error = envelope.into_result::<Item>().expect_err("should fail");
        assert_eq!(error.code(), crate::TRANSPORT_ERROR_CODE);
        assert!(error.message().starts_with("response deserialization failed"));
    }
}
