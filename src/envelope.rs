//! JSON-RPC envelope parsing and serialization.
//!
//! A frame on either stream is one of three shapes (§3 of the spec): a
//! *request* (carries `id` and `method`), a *response* (carries `id` and
//! exactly one of `result`/`error`), or an *event* (carries `method`, no
//! `id`). The proxy never manufactures `error` responses of its own.
//!
//! Two JSON strategies coexist deliberately (§9): [`Envelope`] gives typed
//! access to the three envelope shapes, but `params`/`result` stay as
//! `serde_json::Value` so rule handlers can path-patch fields whose full
//! shape the proxy does not model (see `crate::schema` for the fields it
//! does).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Params = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Request { id: i64, method: String, params: Params },
    Response { id: i64, result: Option<Value>, error: Option<Value> },
    Event { method: String, params: Params },
}

/// Raw wire shape used only to classify an incoming frame; every field is
/// optional since Request/Response/Event each populate a different subset.
#[derive(Debug, Deserialize)]
struct RawFrame {
    id: Option<i64>,
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    result: Option<Value>,
    error: Option<Value>,
}

impl Envelope {
    pub fn parse(raw: &str) -> Result<Self> {
        let frame: RawFrame = serde_json::from_str(raw)?;
        Self::from_raw(frame)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let frame: RawFrame = serde_json::from_value(value)?;
        Self::from_raw(frame)
    }

    fn from_raw(frame: RawFrame) -> Result<Self> {
        let params = match frame.params {
            Some(Value::Object(map)) => map,
            Some(other) => return Err(Error::Decode(format!("params was not an object: {other}"))),
            None => Map::new(),
        };
        match (frame.id, frame.method) {
            (Some(id), Some(method)) => Ok(Envelope::Request { id, method, params }),
            (Some(id), None) => Ok(Envelope::Response { id, result: frame.result, error: frame.error }),
            (None, Some(method)) => Ok(Envelope::Event { method, params }),
            (None, None) => Err(Error::Decode("frame has neither id nor method".into())),
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Envelope::Request { method, .. } | Envelope::Event { method, .. } => Some(method),
            Envelope::Response { .. } => None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Envelope::Request { id, .. } | Envelope::Response { id, .. } => Some(*id),
            Envelope::Event { .. } => None,
        }
    }

    pub fn params(&self) -> Option<&Params> {
        match self {
            Envelope::Request { params, .. } | Envelope::Event { params, .. } => Some(params),
            Envelope::Response { .. } => None,
        }
    }

    pub fn params_mut(&mut self) -> Option<&mut Params> {
        match self {
            Envelope::Request { params, .. } | Envelope::Event { params, .. } => Some(params),
            Envelope::Response { .. } => None,
        }
    }

    pub fn set_method(&mut self, new_method: impl Into<String>) {
        match self {
            Envelope::Request { method, .. } | Envelope::Event { method, .. } => *method = new_method.into(),
            Envelope::Response { .. } => {}
        }
    }

    pub fn into_string(self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }

    /// Renders the envelope back into the flat `{id?, method?, params?,
    /// result?, error?}` wire shape.
    fn to_wire(&self) -> Value {
        match self {
            Envelope::Request { id, method, params } => {
                serde_json::json!({ "id": id, "method": method, "params": params })
            }
            Envelope::Response { id, result, error } => {
                let mut obj = Map::new();
                obj.insert("id".into(), Value::from(*id));
                if let Some(result) = result {
                    obj.insert("result".into(), result.clone());
                } else if let Some(error) = error {
                    obj.insert("error".into(), error.clone());
                }
                Value::Object(obj)
            }
            Envelope::Event { method, params } => {
                serde_json::json!({ "method": method, "params": params })
            }
        }
    }
}

/// Builds a `{id, result}` reply frame, used by every "immediate synthetic
/// reply" rule (§4.2b) and by handlers that answer a front-end request
/// without a further round trip to the device.
pub fn reply(id: i64, result: impl Serialize) -> Result<Envelope> {
    Ok(Envelope::Response { id, result: Some(serde_json::to_value(result)?), error: None })
}

/// Builds a method/params event frame, used by every webkit-side filter that
/// synthesizes a brand-new event rather than reshaping the one it received
/// (`CSS.styleSheetAdded`, `Log.entryAdded`, `Page.screencastFrame`).
pub fn event(method: impl Into<String>, params: impl Serialize) -> Result<Envelope> {
    let params = match serde_json::to_value(params)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return Err(Error::Decode(format!("event params was not an object: {other}"))),
    };
    Ok(Envelope::Event { method: method.into(), params })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request() {
        let e = Envelope::parse(r#"{"id":7,"method":"Log.enable","params":{}}"#).unwrap();
        assert_eq!(e.id(), Some(7));
        assert_eq!(e.method(), Some("Log.enable"));
    }

    #[test]
    fn parses_response() {
        let e = Envelope::parse(r#"{"id":1,"result":{"ok":true}}"#).unwrap();
        assert!(matches!(e, Envelope::Response { id: 1, result: Some(_), error: None }));
    }

    #[test]
    fn parses_event() {
        let e = Envelope::parse(r#"{"method":"Debugger.scriptParsed","params":{"scriptId":"1"}}"#).unwrap();
        assert!(matches!(e, Envelope::Event { .. }));
        assert_eq!(e.id(), None);
    }

    #[test]
    fn rejects_frame_with_neither_id_nor_method() {
        assert!(Envelope::parse(r#"{"foo":"bar"}"#).is_err());
    }

    #[test]
    fn round_trips_request() {
        let raw = r#"{"id":3,"method":"DOM.enable","params":{"a":1}}"#;
        let e = Envelope::parse(raw).unwrap();
        let back = e.clone().into_string().unwrap();
        let reparsed = Envelope::parse(&back).unwrap();
        assert_eq!(e, reparsed);
    }
}
