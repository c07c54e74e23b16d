//! The mediation core (§4.1): classifies inbound frames from either side,
//! dispatches them through the rule pack, and keeps the three correlation
//! tables (`crate::correlation`) consistent. Grounded on `adapter/adapter.go`'s
//! `Adapter` (message pump + `CallTarget`/`FireResultToTools`/`FireEventToTools`)
//! and the teacher's `imp::core::connection::Context` (single-lock shared
//! state, one correlation table per direction of traffic).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::correlation::{FrontendPending, PreconnectBuffer, SyntheticIds, SyntheticPending};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::rules::{RulePack, ToolOutcome, WebkitOutcome, ERROR_FILTER_KEY};
use crate::schema::target::{DispatchMessageFromTarget, TargetParams};
use crate::screencast::ScreencastSession;
use crate::state::SessionState;
use crate::transport::Transport;

pub struct Router {
    frontend: Arc<dyn Transport>,
    device: Mutex<Option<Arc<dyn Transport>>>,
    frontend_pending: FrontendPending,
    synthetic_pending: SyntheticPending,
    synthetic_ids: SyntheticIds,
    preconnect: PreconnectBuffer,
    rule_pack: Arc<RulePack>,
    state: SessionState,
    screencast: Mutex<Option<Arc<ScreencastSession>>>,
    generation: AtomicU64,
}

impl Router {
    pub fn new(
        frontend: Arc<dyn Transport>,
        rule_pack: Arc<RulePack>,
        selector_list_mode: crate::rules::css_mapping::SelectorListMode,
        screencast_defaults: crate::screencast::ScreencastConfig,
    ) -> Arc<Self> {
        let preconnect = PreconnectBuffer::default();
        preconnect.open();
        Arc::new(Self {
            frontend,
            device: Mutex::new(None),
            frontend_pending: FrontendPending::default(),
            synthetic_pending: SyntheticPending::default(),
            synthetic_ids: SyntheticIds::default(),
            preconnect,
            rule_pack,
            state: SessionState::new(selector_list_mode, screencast_defaults),
            screencast: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn frontend(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.frontend)
    }

    /// Makes the device transport available and replays whatever front-end
    /// traffic arrived before it (§4.1 "Preconnect drain").
    pub async fn attach_device(self: &Arc<Self>, device: Arc<dyn Transport>) -> Result<()> {
        *self.device.lock().unwrap() = Some(device);
        for raw in self.preconnect.drain() {
            self.process_frontend_frame(raw).await?;
        }
        Ok(())
    }

    /// *receive-from-frontend* (§4.1).
    pub async fn receive_from_frontend(self: &Arc<Self>, raw: String) -> Result<()> {
        match self.preconnect.push_if_open(raw) {
            None => Ok(()),
            Some(raw) => self.process_frontend_frame(raw).await,
        }
    }

    async fn process_frontend_frame(self: &Arc<Self>, raw: String) -> Result<()> {
        let envelope = match Envelope::parse(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                log::warn!("dropping malformed front-end frame: {err}");
                return Ok(());
            }
        };
        let (id, method) = match &envelope {
            Envelope::Request { id, method, .. } => (*id, method.clone()),
            _ => {
                log::warn!("front-end frame without id/method dropped");
                return Ok(());
            }
        };

        let outcome = match self.rule_pack.tool_filter(&method) {
            Some(filter) => filter(Arc::clone(self), envelope).await?,
            None => ToolOutcome::Forward(envelope),
        };

        match outcome {
            ToolOutcome::Suppressed => {}
            ToolOutcome::Forward(envelope) => {
                self.frontend_pending.insert(id, method);
                let wrapped = self.wrap_for_device(envelope)?;
                self.send_to_device(wrapped).await?;
            }
        }
        Ok(())
    }

    /// *receive-from-device* (§4.1).
    pub async fn receive_from_device(self: &Arc<Self>, raw: String) -> Result<()> {
        let envelope = match Envelope::parse(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                log::warn!("dropping malformed device frame: {err}");
                return Ok(());
            }
        };
        let envelope = match self.unwrap_device_frame(envelope) {
            Some(envelope) => envelope,
            None => {
                log::warn!("dropping non-Target device frame while target-based");
                return Ok(());
            }
        };

        match envelope {
            Envelope::Response { id, result, error } => self.dispatch_device_response(id, result, error).await,
            Envelope::Event { method, params } => {
                let envelope = Envelope::Event { method: method.clone(), params };
                let outcome = match self.rule_pack.webkit_filter(&method) {
                    Some(filter) => filter(Arc::clone(self), envelope).await?,
                    None => WebkitOutcome::Forward(envelope),
                };
                if let WebkitOutcome::Forward(envelope) = outcome {
                    self.send_to_frontend(envelope).await?;
                }
                Ok(())
            }
            Envelope::Request { method, .. } => {
                log::warn!("device sent a request frame ({method}); dropping");
                Ok(())
            }
        }
    }

    async fn dispatch_device_response(
        self: &Arc<Self>,
        id: i64,
        result: Option<Value>,
        error: Option<Value>,
    ) -> Result<()> {
        if let Some(method) = self.frontend_pending.take(id) {
            let use_error_filter = error.is_some() && self.rule_pack.has_error_filter();
            let filter_key = if use_error_filter { ERROR_FILTER_KEY } else { method.as_str() };
            let envelope = Envelope::Response { id, result, error };
            let outcome = match self.rule_pack.webkit_filter(filter_key) {
                Some(filter) => filter(Arc::clone(self), envelope).await?,
                None => WebkitOutcome::Forward(envelope),
            };
            if let WebkitOutcome::Forward(envelope) = outcome {
                self.send_to_frontend(envelope).await?;
            }
            return Ok(());
        }
        if let Some(tx) = self.synthetic_pending.take(id) {
            let reply = match error {
                Some(error) => Err(error),
                None => Ok(result.unwrap_or(Value::Null)),
            };
            let _ = tx.send(reply);
            return Ok(());
        }
        log::warn!("unsolicited device response id={id}");
        Ok(())
    }

    /// *call-device* (§4.1): issues a synthetic request and awaits its reply.
    pub async fn call_device(self: &Arc<Self>, method: impl Into<String>, params: Value) -> Result<Value> {
        let method = method.into();
        let id = self.synthetic_ids.next();
        let (tx, rx) = oneshot::channel();
        self.synthetic_pending.insert(id, tx);

        let params = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => return Err(Error::Decode(format!("call_device params was not an object: {other}"))),
        };
        let envelope = Envelope::Request { id, method, params };
        let wrapped = self.wrap_for_device(envelope)?;
        self.send_to_device(wrapped).await?;

        match rx.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(error)) => Err(Error::DeviceError(error)),
            Err(_) => Err(Error::CallCancelled(None)),
        }
    }

    pub async fn send_to_frontend(&self, envelope: Envelope) -> Result<()> {
        let text = envelope.into_string()?;
        self.frontend.send(text).await?;
        Ok(())
    }

    async fn send_to_device(&self, envelope: Envelope) -> Result<()> {
        let text = envelope.into_string()?;
        let device = self.device.lock().unwrap().clone();
        match device {
            Some(transport) => {
                transport.send(text).await?;
                Ok(())
            }
            None => Err(Error::SessionClosed),
        }
    }

    /// §4.1 "Target wrapping".
    fn wrap_for_device(&self, envelope: Envelope) -> Result<Envelope> {
        if !self.state.is_target_based() {
            return Ok(envelope);
        }
        let method = envelope.method().unwrap_or_default();
        if method.contains("Target") {
            return Ok(envelope);
        }
        let id = envelope.id();
        let target_id = self.state.target_id().unwrap_or_default();
        let inner_raw = envelope.into_string()?;

        let wrapped = TargetParams { target_id, message: inner_raw };
        let mut params = match serde_json::to_value(wrapped)? {
            Value::Object(map) => map,
            _ => unreachable!("TargetParams always serializes to an object"),
        };
        if let Some(id) = id {
            params.insert("id".into(), Value::from(id));
        }
        match id {
            Some(id) => Ok(Envelope::Request { id, method: "Target.sendMessageToTarget".into(), params }),
            None => Ok(Envelope::Event { method: "Target.sendMessageToTarget".into(), params }),
        }
    }

    /// §4.1 "receive-from-device first unwraps".
    fn unwrap_device_frame(&self, envelope: Envelope) -> Option<Envelope> {
        if !self.state.is_target_based() {
            return Some(envelope);
        }
        let method = envelope.method()?.to_string();
        if !method.starts_with("Target.") {
            return None;
        }
        if method != "Target.dispatchMessageFromTarget" {
            return Some(envelope);
        }
        let params = envelope.params()?.clone();
        let dispatch: DispatchMessageFromTarget = serde_json::from_value(Value::Object(params)).ok()?;
        Envelope::parse(&dispatch.message).ok()
    }

    /// Starts (replacing any prior) screencast session, bumping the
    /// generation counter so stale continuations from the old one no-op
    /// (§4.3 "Stop", §9 "Recursive screencast stop").
    pub fn replace_screencast(&self, new: Option<Arc<ScreencastSession>>) -> u64 {
        let mut guard = self.screencast.lock().unwrap();
        if let Some(old) = guard.take() {
            old.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *guard = new;
        generation
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn screencast(&self) -> Option<Arc<ScreencastSession>> {
        self.screencast.lock().unwrap().clone()
    }
}
