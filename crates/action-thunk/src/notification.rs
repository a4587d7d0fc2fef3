// notification.rs — The record dispatched at each lifecycle point.
//
// Serialized shape is `{type, payload?, meta?, error?}`: absent fields are
// omitted entirely rather than written as null, and `error` only appears
// when it is true. A fresh Notification is built for every dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::WorkFault;
use crate::types::ActionTypes;

/// One dispatched lifecycle notification (an "action").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// The notification identifier, e.g. `FETCH_SUCCEEDED`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Caller-supplied metadata side channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    /// Set on FAILED notifications; the payload then describes the fault.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Notification {
    /// A bare notification with no payload or meta.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
            meta: None,
            error: false,
        }
    }

    /// Set the payload and return self. `null` means "no payload".
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = non_null(payload);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = non_null(meta);
        self
    }

    /// STARTED: the payload is the list of bound arguments.
    pub fn started(types: &ActionTypes, args: &[Value]) -> Self {
        Notification::new(types.started()).with_payload(Value::Array(args.to_vec()))
    }

    /// SUCCEEDED: shaped from the resolved data (see [`SuccessShape`]).
    pub fn succeeded(types: &ActionTypes, data: &Value) -> Self {
        let notification = Notification::new(types.succeeded());
        match SuccessShape::of(data) {
            SuccessShape::Enveloped { payload, meta } => Notification {
                payload: Some(payload.clone()),
                meta: meta.cloned(),
                ..notification
            },
            SuccessShape::Raw(value) => notification.with_payload(value.clone()),
        }
    }

    pub fn failed(types: &ActionTypes, fault: &WorkFault) -> Self {
        Notification {
            error: true,
            ..Notification::new(types.failed()).with_payload(fault.to_payload())
        }
    }

    /// ENDED: `{"elapsed": <milliseconds>}`.
    pub fn ended(types: &ActionTypes, elapsed_ms: u64) -> Self {
        Notification::new(types.ended()).with_payload(json!({ "elapsed": elapsed_ms }))
    }

    /// The `elapsed` field of an ENDED payload, if this notification has one.
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.payload.as_ref()?.get("elapsed")?.as_u64()
    }
}

fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

/// How a successful result maps onto the SUCCEEDED notification.
///
/// An object with a non-null `payload` key is an envelope: its `payload`
/// becomes the notification payload and its `meta` the notification meta.
/// Anything else is used as the payload as-is.
#[derive(Debug, PartialEq)]
pub enum SuccessShape<'a> {
    Enveloped {
        payload: &'a Value,
        meta: Option<&'a Value>,
    },
    Raw(&'a Value),
}

impl<'a> SuccessShape<'a> {
    pub fn of(data: &'a Value) -> Self {
        match data {
            Value::Object(map) => match map.get("payload") {
                Some(payload) if !payload.is_null() => SuccessShape::Enveloped {
                    payload,
                    meta: map.get("meta").filter(|meta| !meta.is_null()),
                },
                _ => SuccessShape::Raw(data),
            },
            _ => SuccessShape::Raw(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch() -> ActionTypes {
        ActionTypes::new("FETCH").unwrap()
    }

    #[test]
    fn started_carries_argument_list() {
        let n = Notification::started(&fetch(), &[json!(1)]);
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "type": "FETCH_STARTED", "payload": [1] })
        );
    }

    #[test]
    fn started_with_no_arguments_has_empty_list() {
        let n = Notification::started(&fetch(), &[]);
        assert_eq!(n.payload, Some(json!([])));
    }

    #[test]
    fn succeeded_uses_raw_value() {
        let n = Notification::succeeded(&fetch(), &json!(3));
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "type": "FETCH_SUCCEEDED", "payload": 3 })
        );
    }

    #[test]
    fn succeeded_unwraps_envelope_with_meta() {
        let n = Notification::succeeded(&fetch(), &json!({ "payload": 2, "meta": 3 }));
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "type": "FETCH_SUCCEEDED", "payload": 2, "meta": 3 })
        );
    }

    #[test]
    fn succeeded_with_null_has_no_payload_field() {
        let n = Notification::succeeded(&fetch(), &Value::Null);
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "type": "FETCH_SUCCEEDED" })
        );
    }

    #[test]
    fn object_without_payload_key_is_raw() {
        let data = json!({ "meta": 1, "items": [] });
        assert_eq!(SuccessShape::of(&data), SuccessShape::Raw(&data));
        let nulled = json!({ "payload": null, "meta": 1 });
        assert_eq!(SuccessShape::of(&nulled), SuccessShape::Raw(&nulled));
    }

    #[test]
    fn failed_sets_error_marker() {
        let n = Notification::failed(&fetch(), &WorkFault::new("boom!"));
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({ "type": "FETCH_FAILED", "payload": { "message": "boom!" }, "error": true })
        );
    }

    #[test]
    fn ended_carries_elapsed() {
        let n = Notification::ended(&fetch(), 42);
        assert_eq!(n.kind, "FETCH_ENDED");
        assert_eq!(n.elapsed_ms(), Some(42));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let n: Notification = serde_json::from_str(r#"{"type":"FETCH_ENDED"}"#).unwrap();
        assert_eq!(n, Notification::new("FETCH_ENDED"));
        assert!(!n.error);
    }
}
