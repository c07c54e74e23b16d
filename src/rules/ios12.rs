//! iOS >= 12.2 overlay (§4.4), grounded on `adapter/iOS12.go`: composes the
//! iOS 9 pack and adds `Target.targetCreated` handling, which is also the
//! point at which target-based wrapping (`Target.sendMessageToTarget` /
//! `Target.dispatchMessageFromTarget`) turns on for the session.
//!
//! The source flips `SetTargetBased(true)` unconditionally at pack-install
//! time, before any target id is known. This crate instead turns wrapping on
//! only once `Target.targetCreated` actually arrives (see DESIGN.md): a
//! `RulePack` is shared, version-agnostic state with no per-session handle to
//! flip, so the flag and the id are set together in `SessionState`.

use std::sync::Arc;

use serde_json::Value;

use crate::rules::{RulePack, WebkitOutcome};

pub fn install(pack: &mut RulePack) {
    pack.add_webkit_filter(
        "Target.targetCreated",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                if let Some(target_id) = envelope
                    .params()
                    .and_then(|params| params.get("targetInfo"))
                    .and_then(|info| info.get("targetId"))
                    .and_then(Value::as_str)
                {
                    router.state().enable_target_based_wrapping(target_id);
                }
                Ok(WebkitOutcome::Forward(envelope))
            })
        }),
    );
}
