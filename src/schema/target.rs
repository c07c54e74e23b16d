//! The `Target.*` wrapping envelope used once a device negotiates the
//! target-based protocol (iOS >= 12.2, §4.1 and §7 iOS12 overlay), grounded
//! on `entity/adapterProtocol.go`'s `TargetParams`. The inner frame itself
//! is just another [`crate::envelope::Envelope`], so it isn't modeled again
//! here.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Params of `Target.sendMessageToTarget`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetParams {
    pub message: String,
    pub target_id: String,
}

/// Params of `Target.dispatchMessageFromTarget`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMessageFromTarget {
    pub message: String,
    pub target_id: String,
}
