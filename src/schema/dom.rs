//! DOM entities touched by the rule pack, grounded on
//! `entity/WebKitProtocol/dom.go`.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub script_id: Option<String>,
    pub line_number: Option<i64>,
    pub column_number: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventListener {
    pub event_listener_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub use_capture: Option<bool>,
    pub is_attribute: Option<bool>,
    pub node_id: Option<i64>,
    pub on_window: Option<bool>,
    pub location: Option<Location>,
    pub handler_name: Option<String>,
    pub passive: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetEventListenersForNodeResult {
    #[serde(default)]
    pub listeners: Vec<EventListener>,
}
