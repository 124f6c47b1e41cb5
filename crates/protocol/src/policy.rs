//! Per-category handling of absent or `null` results.
//!
//! Endpoint families disagree on what "no data" means, and callers depend on
//! each family's convention. Every façade call therefore names its category
//! explicitly by choosing one of the [`ResultPolicy`] types below:
//!
//! | Policy | Output | Absent envelope / `null` result |
//! |--------|--------|---------------------------------|
//! | [`ChangeCount`] | `i64` | [`UNKNOWN_CHANGE_COUNT`] |
//! | [`NameList`] | `Vec<String>` | empty |
//! | [`Resource<T>`] | `Option<T>` | `None` |
//! | [`ResourceList<T>`] | `Vec<T>` | empty |
//! | [`StatusCheck`] | `Option<String>` | `None`; otherwise the envelope `status` |
//! | [`ResourceUrl`] | `Option<String>` | `None` |
//! | [`Authorized`] | `Option<bool>` | `None` |
//! | [`Acknowledge`] | `()` | `()` |
//!
//! A 404 never reaches a policy: the invoker has already returned a
//! [`ClientError`] with code 404.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::ResponseEnvelope;
use crate::errors::{ClientError, TransportError};
use crate::types::{ResultAuthorized, ResultChangeCount, ResultNameArray, ResultResourceUrl};

/// Change count meaning "the outcome is unknown", distinct from `0` changes.
pub const UNKNOWN_CHANGE_COUNT: i64 = -1;

/// Converts the envelope of a successful call into a façade return value.
pub trait ResultPolicy {
    type Output;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Self::Output, ClientError>;
}

/// Grant, revoke, enable, disable, delete, undelete, change-owner.
///
/// Accepts `{"changes": N}` or a bare integer. Anything else, including an
/// absent envelope, yields [`UNKNOWN_CHANGE_COUNT`] and never an error.
pub struct ChangeCount;

impl ResultPolicy for ChangeCount {
    type Output = i64;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<i64, ClientError> {
        let count = envelope
            .as_ref()
            .and_then(ResponseEnvelope::result)
            .and_then(change_count_of);
        Ok(count.unwrap_or(UNKNOWN_CHANGE_COUNT))
    }
}

fn change_count_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::Object(_) => serde_json::from_value::<ResultChangeCount>(value.clone())
            .ok()?
            .changes,
        _ => None,
    }
}

/// Role, permission, and other name listings.
///
/// Accepts `{"names": [...]}` or a bare array of strings.
pub struct NameList;

impl ResultPolicy for NameList {
    type Output = Vec<String>;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Vec<String>, ClientError> {
        let Some(value) = envelope.and_then(|e| e.result).filter(|v| !v.is_null()) else {
            return Ok(Vec::new());
        };
        if value.is_array() {
            return decode(value);
        }
        let wrapper: ResultNameArray = decode(value)?;
        Ok(wrapper.names.unwrap_or_default())
    }
}

/// Get-by-id. A `null` result on a 2xx is a valid "no data" outcome.
pub struct Resource<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> ResultPolicy for Resource<T> {
    type Output = Option<T>;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Option<T>, ClientError> {
        match envelope {
            Some(envelope) => envelope.into_result(),
            None => Ok(None),
        }
    }
}

/// List and search calls.
pub struct ResourceList<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> ResultPolicy for ResourceList<T> {
    type Output = Vec<T>;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Vec<T>, ClientError> {
        match envelope {
            Some(envelope) => envelope.into_list(),
            None => Ok(Vec::new()),
        }
    }
}

/// Health and readiness checks: the envelope `status`, not its `result`.
pub struct StatusCheck;

impl ResultPolicy for StatusCheck {
    type Output = Option<String>;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Option<String>, ClientError> {
        Ok(envelope
            .filter(|e| e.result().is_some())
            .and_then(|e| e.status))
    }
}

/// Create calls returning `{"url": "..."}` (a bare string is also accepted).
pub struct ResourceUrl;

impl ResultPolicy for ResourceUrl {
    type Output = Option<String>;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Option<String>, ClientError> {
        match envelope.and_then(|e| e.result).filter(|v| !v.is_null()) {
            None => Ok(None),
            Some(Value::String(url)) => Ok(Some(url)),
            Some(value) => Ok(decode::<ResultResourceUrl>(value)?.url),
        }
    }
}

/// Authorisation checks returning `{"isAuthorized": bool}` (or a bare bool).
pub struct Authorized;

impl ResultPolicy for Authorized {
    type Output = Option<bool>;

    fn apply(envelope: Option<ResponseEnvelope>) -> Result<Option<bool>, ClientError> {
        match envelope.and_then(|e| e.result).filter(|v| !v.is_null()) {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(flag)),
            Some(value) => Ok(decode::<ResultAuthorized>(value)?.is_authorized),
        }
    }
}

/// Calls whose payload, if any, is ignored.
pub struct Acknowledge;

impl ResultPolicy for Acknowledge {
    type Output = ();

    fn apply(_envelope: Option<ResponseEnvelope>) -> Result<(), ClientError> {
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::normalize(TransportError::Decode(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn envelope(result: Value) -> Option<ResponseEnvelope> {
        Some(ResponseEnvelope::success("ok", "1.0", Some(result)))
    }

    #[test]
    fn change_count_reads_wrapper_and_bare_integer() {
        assert_eq!(ChangeCount::apply(envelope(json!({"changes": 3}))).expect("apply"), 3);
        assert_eq!(ChangeCount::apply(envelope(json!({"changes": 0}))).expect("apply"), 0);
        assert_eq!(ChangeCount::apply(envelope(json!(2))).expect("apply"), 2);
    }

    #[test]
    fn change_count_without_usable_count_is_unknown() {
        assert_eq!(ChangeCount::apply(None).expect("apply"), UNKNOWN_CHANGE_COUNT);
        assert_eq!(ChangeCount::apply(envelope(Value::Null)).expect("apply"), -1);
        assert_eq!(ChangeCount::apply(envelope(json!({}))).expect("apply"), -1);
        assert_eq!(ChangeCount::apply(envelope(json!({"changes": "x"}))).expect("apply"), -1);
        assert_eq!(ChangeCount::apply(envelope(json!("three"))).expect("apply"), -1);
    }

    #[test]
    fn name_list_reads_wrapper_and_bare_array() {
        assert_eq!(
            NameList::apply(envelope(json!({"names": ["READ", "MODIFY"]}))).expect("apply"),
            vec!["READ", "MODIFY"]
        );
        assert_eq!(NameList::apply(envelope(json!(["a"]))).expect("apply"), vec!["a"]);
    }

    #[test]
    fn name_list_absent_is_empty() {
        assert!(NameList::apply(None).expect("apply").is_empty());
        assert!(NameList::apply(envelope(Value::Null)).expect("apply").is_empty());
        assert!(NameList::apply(envelope(json!({}))).expect("apply").is_empty());
    }

    #[test]
    fn name_list_with_wrong_shape_is_decode_error() {
        let error = NameList::apply(envelope(json!({"names": 5}))).expect_err("should fail");
        assert_eq!(error.code(), -1);
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Thing {
        id: String,
    }

    #[test]
    fn resource_null_is_none_and_value_is_typed() {
        assert_eq!(Resource::<Thing>::apply(envelope(Value::Null)).expect("apply"), None);
        assert_eq!(Resource::<Thing>::apply(None).expect("apply"), None);
        assert_eq!(
            Resource::<Thing>::apply(envelope(json!({"id": "t1"}))).expect("apply"),
            Some(Thing { id: "t1".to_owned() })
        );
    }

    #[test]
    fn resource_list_null_is_empty() {
        assert!(ResourceList::<Thing>::apply(envelope(Value::Null)).expect("apply").is_empty());
        assert!(ResourceList::<Thing>::apply(None).expect("apply").is_empty());
        assert_eq!(
            ResourceList::<Thing>::apply(envelope(json!([{"id": "a"}, {"id": "b"}])))
                .expect("apply")
                .len(),
            2
        );
    }

    #[test]
    fn status_check_returns_status_not_result() {
        assert_eq!(
            StatusCheck::apply(envelope(json!({"checkNum": 1}))).expect("apply").as_deref(),
            Some("success")
        );
        assert_eq!(StatusCheck::apply(envelope(Value::Null)).expect("apply"), None);
        assert_eq!(StatusCheck::apply(None).expect("apply"), None);
    }

    #[test]
    fn resource_url_and_authorized() {
        assert_eq!(
            ResourceUrl::apply(envelope(json!({"url": "https://h/v3/systems/s1"})))
                .expect("apply")
                .as_deref(),
            Some("https://h/v3/systems/s1")
        );
        assert_eq!(ResourceUrl::apply(envelope(Value::Null)).expect("apply"), None);
        assert_eq!(
            Authorized::apply(envelope(json!({"isAuthorized": false}))).expect("apply"),
            Some(false)
        );
        assert_eq!(Authorized::apply(envelope(json!(true))).expect("apply"), Some(true));
        assert_eq!(Authorized::apply(None).expect("apply"), None);
    }

    #[test]
    fn acknowledge_ignores_payload() {
        Acknowledge::apply(envelope(json!({"anything": 1}))).expect("apply");
        Acknowledge::apply(None).expect("apply");
    }
}
