//! iOS 8 overlay (§4.4), grounded on `iOS8.go`: flattens selector lists to
//! `{text, range}` pairs (handled by `DeviceVersion::selector_list_mode`,
//! consulted by `css_mapping::map_rule`) and swallows device errors into
//! empty successful replies rather than surfacing them to the front-end.

use std::sync::Arc;

use serde_json::json;

use crate::envelope::Envelope;
use crate::rules::{RulePack, WebkitFilter, WebkitOutcome, ERROR_FILTER_KEY};

pub fn install(pack: &mut RulePack) {
    pack.add_webkit_filter(ERROR_FILTER_KEY, error_to_empty_result());
}

fn error_to_empty_result() -> WebkitFilter {
    Arc::new(|_router, envelope| {
        Box::pin(async move {
            let Envelope::Response { id, .. } = envelope else {
                return Ok(WebkitOutcome::Forward(envelope));
            };
            Ok(WebkitOutcome::Forward(Envelope::Response { id, result: Some(json!({})), error: None }))
        })
    })
}
