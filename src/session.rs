//! Wires a front-end transport, a device transport, and a device version
//! string into a running [`Router`] plus its two reader tasks (§5
//! "Scheduling model"), grounded on the teacher's `imp::core::connection`
//! constructor that spawns a connection's background tasks at build time.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::Result;
use crate::router::Router;
use crate::screencast::ScreencastConfig;
use crate::transport::Transport;
use crate::version::{self, DeviceVersion};

/// The in-process equivalent of the flags a CDP front-door CLI would parse
/// (§10 "Configuration") — this crate owns no flag parsing itself, just the
/// values a session needs once a device version string and transport pair
/// are already in hand.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Raw device version string (e.g. `"12.4"`), resolved to a
    /// [`DeviceVersion`] by [`version::select`].
    pub device_version: String,
    /// Defaults applied to whichever of `Page.startScreencast`'s params the
    /// front-end omits.
    pub screencast: ScreencastConfig,
}

/// A running front-end<->device pairing. Dropping it does not stop the
/// reader tasks; call [`Session::shutdown`] for a clean stop.
pub struct Session {
    pub router: Arc<Router>,
    device_version: DeviceVersion,
    frontend_task: JoinHandle<()>,
    device_task: JoinHandle<()>,
}

impl Session {
    /// Builds the rule pack for `config.device_version`, attaches `device`,
    /// and spawns the front-end/device reader tasks (§5). Any front-end
    /// frames that arrive before this call are buffered by the router's
    /// preconnect buffer and replayed once `device` is attached.
    pub async fn start(frontend: Arc<dyn Transport>, device: Arc<dyn Transport>, config: SessionConfig) -> Result<Self> {
        let device_version = version::select(&config.device_version);
        let rule_pack = Arc::new(device_version.build_rule_pack());
        let router = Router::new(frontend, rule_pack, device_version.selector_list_mode(), config.screencast);
        router.attach_device(Arc::clone(&device)).await?;

        let frontend_task = {
            let router = Arc::clone(&router);
            tokio::spawn(async move { Self::pump_frontend(router).await })
        };
        let device_task = {
            let router = Arc::clone(&router);
            tokio::spawn(async move { Self::pump_device(router, device).await })
        };

        Ok(Self { router, device_version, frontend_task, device_task })
    }

    pub fn device_version(&self) -> DeviceVersion {
        self.device_version
    }

    async fn pump_frontend(router: Arc<Router>) {
        loop {
            let frontend = router.frontend();
            match frontend.recv().await {
                Ok(Some(raw)) => {
                    if let Err(err) = router.receive_from_frontend(raw).await {
                        log::warn!("front-end frame handling failed: {err}");
                    }
                }
                Ok(None) => {
                    log::info!("front-end transport closed");
                    return;
                }
                Err(err) => {
                    log::warn!("front-end transport error: {err}");
                    return;
                }
            }
        }
    }

    async fn pump_device(router: Arc<Router>, device: Arc<dyn Transport>) {
        loop {
            match device.recv().await {
                Ok(Some(raw)) => {
                    if let Err(err) = router.receive_from_device(raw).await {
                        log::warn!("device frame handling failed: {err}");
                    }
                }
                Ok(None) => {
                    log::info!("device transport closed");
                    return;
                }
                Err(err) => {
                    log::warn!("device transport error: {err}");
                    return;
                }
            }
        }
    }

    /// Aborts both reader tasks. The router itself has no further cleanup:
    /// its screencast session (if any) is dropped along with it.
    pub fn shutdown(&self) {
        self.frontend_task.abort();
        self.device_task.abort();
    }
}
