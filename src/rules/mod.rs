//! Translation rule pack (§4.2): a per-method mapping from method name to a
//! *tool filter* (CDP-bound, applied in `receive_from_frontend`) and/or a
//! *webkit filter* (CDP-bound replies/events, applied in
//! `receive_from_device`), assembled per-version in [`base`]/[`ios8`]/
//! [`ios9`]/[`ios12`] and composed by [`crate::version`].

pub mod base;
pub mod css_mapping;
pub mod ios12;
pub mod ios8;
pub mod ios9;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::router::Router;

/// What a tool-side filter did with a front-end request.
pub enum ToolOutcome {
    /// Forward this (possibly rewritten) envelope to the device.
    Forward(Envelope),
    /// The front-end has already been answered out-of-band; forward nothing.
    Suppressed,
}

/// What a webkit-side filter did with a device response or event.
pub enum WebkitOutcome {
    /// Forward this (possibly rewritten) envelope to the front-end.
    Forward(Envelope),
    /// Nothing further goes to the front-end (a multi-step translation
    /// already replied, or the event was fully absorbed).
    Suppressed,
}

pub type ToolFilter = Arc<dyn Fn(Arc<Router>, Envelope) -> BoxFuture<'static, Result<ToolOutcome>> + Send + Sync>;
pub type WebkitFilter = Arc<dyn Fn(Arc<Router>, Envelope) -> BoxFuture<'static, Result<WebkitOutcome>> + Send + Sync>;

/// The `"error"` key under which the iOS 8 pack registers a webkit filter
/// matched only against device *error* responses (§4.1 receive-from-device).
pub const ERROR_FILTER_KEY: &str = "error";

#[derive(Default)]
pub struct RulePack {
    tool_filters: HashMap<&'static str, ToolFilter>,
    webkit_filters: HashMap<&'static str, WebkitFilter>,
}

impl RulePack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool_filter(&self, method: &str) -> Option<&ToolFilter> {
        self.tool_filters.get(method)
    }

    pub fn webkit_filter(&self, method: &str) -> Option<&WebkitFilter> {
        self.webkit_filters.get(method)
    }

    pub fn has_error_filter(&self) -> bool {
        self.webkit_filters.contains_key(ERROR_FILTER_KEY)
    }

    pub fn add_tool_filter(&mut self, method: &'static str, filter: ToolFilter) {
        self.tool_filters.insert(method, filter);
    }

    pub fn add_webkit_filter(&mut self, method: &'static str, filter: WebkitFilter) {
        self.webkit_filters.insert(method, filter);
    }
}

/// Builds a tool filter that renames the method in place (§4.2a "Pure
/// method renames") and forwards unconditionally.
pub fn rename(new_method: &'static str) -> ToolFilter {
    Arc::new(move |_router, mut envelope| {
        Box::pin(async move {
            envelope.set_method(new_method);
            Ok(ToolOutcome::Forward(envelope))
        })
    })
}

/// Builds a tool filter that immediately answers the front-end without
/// contacting the device (§4.2b "Immediate synthetic replies").
pub fn immediate_reply(result: impl serde::Serialize + Send + Sync + Clone + 'static) -> ToolFilter {
    Arc::new(move |router, envelope| {
        let result = result.clone();
        Box::pin(async move {
            if let Some(id) = envelope.id() {
                let reply = crate::envelope::reply(id, result)?;
                router.send_to_frontend(reply).await?;
            }
            Ok(ToolOutcome::Suppressed)
        })
    })
}
