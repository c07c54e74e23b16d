//! Session-scoped protocol state mutated by rule handlers (§5 "Shared
//! mutable state"): `lastNodeId`, `lastScriptEval`, `lastPageExecutionContextId`,
//! target-based wrapping flags, and the active selector-list mode. Guarded
//! by a single `std::sync::Mutex`, never held across `.await`, matching the
//! teacher's synchronous-lock-around-short-critical-section convention in
//! `imp::core::connection::Context`.

use std::sync::Mutex;

use crate::rules::css_mapping::SelectorListMode;
use crate::screencast::ScreencastConfig;

#[derive(Debug)]
struct Inner {
    last_node_id: i64,
    last_script_eval: Option<String>,
    last_page_execution_context_id: Option<i64>,
    is_target_based: bool,
    target_id: Option<String>,
}

#[derive(Debug)]
pub struct SessionState {
    selector_list_mode: SelectorListMode,
    screencast_defaults: ScreencastConfig,
    inner: Mutex<Inner>,
}

impl SessionState {
    pub fn new(selector_list_mode: SelectorListMode, screencast_defaults: ScreencastConfig) -> Self {
        Self {
            selector_list_mode,
            screencast_defaults,
            inner: Mutex::new(Inner {
                last_node_id: 0,
                last_script_eval: None,
                last_page_execution_context_id: None,
                is_target_based: false,
                target_id: None,
            }),
        }
    }

    pub fn selector_list_mode(&self) -> SelectorListMode {
        self.selector_list_mode
    }

    /// Session-level screencast defaults (§10 "Configuration"), used to
    /// fill in whichever of `Page.startScreencast`'s params the front-end
    /// omits.
    pub fn screencast_defaults(&self) -> &ScreencastConfig {
        &self.screencast_defaults
    }

    pub fn set_last_node_id(&self, id: i64) {
        self.inner.lock().unwrap().last_node_id = id;
    }

    pub fn last_node_id(&self) -> i64 {
        self.inner.lock().unwrap().last_node_id
    }

    pub fn set_last_script_eval(&self, script_id: impl Into<String>) {
        self.inner.lock().unwrap().last_script_eval = Some(script_id.into());
    }

    pub fn last_script_eval(&self) -> Option<String> {
        self.inner.lock().unwrap().last_script_eval.clone()
    }

    pub fn set_last_page_execution_context_id(&self, id: i64) {
        self.inner.lock().unwrap().last_page_execution_context_id = Some(id);
    }

    pub fn is_target_based(&self) -> bool {
        self.inner.lock().unwrap().is_target_based
    }

    pub fn target_id(&self) -> Option<String> {
        self.inner.lock().unwrap().target_id.clone()
    }

    /// Set once by the iOS 12 pack's `Target.targetCreated` handler; §3
    /// documents this as immutable for the rest of the session.
    pub fn enable_target_based_wrapping(&self, target_id: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.is_target_based = true;
        inner.target_id = Some(target_id.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_the_screencast_defaults_it_was_built_with() {
        let defaults = ScreencastConfig { format: "png".into(), quality: 42, max_width: 640, max_height: 480, ..Default::default() };
        let state = SessionState::new(SelectorListMode::Ios9Plus, defaults.clone());
        assert_eq!(state.screencast_defaults().format, defaults.format);
        assert_eq!(state.screencast_defaults().quality, defaults.quality);
        assert_eq!(state.screencast_defaults().max_width, defaults.max_width);
        assert_eq!(state.screencast_defaults().max_height, defaults.max_height);
    }
}
