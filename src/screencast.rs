//! The screencast pacing loop (§4.3), grounded on
//! `adapter/ScreencastSession.go`'s `screencastSession`. Synthesizes a
//! `Page.screencastFrame` event stream from periodic `Page.snapshotRect`
//! calls, holding at most one unacked frame in flight.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde_json::json;

use crate::error::Result;
use crate::router::Router;

#[derive(Debug, Clone)]
pub struct ScreencastConfig {
    pub format: String,
    pub quality: i64,
    pub max_width: i64,
    pub max_height: i64,
    pub frame_interval: Duration,
}

impl Default for ScreencastConfig {
    fn default() -> Self {
        Self { format: "jpg".into(), quality: 100, max_width: 1024, max_height: 1024, frame_interval: Duration::from_millis(250) }
    }
}

#[derive(Debug, Default)]
struct DeviceMetrics {
    device_width: i64,
    device_height: i64,
    page_scale_factor: i64,
    offset_top: i64,
    scroll_offset_x: i64,
    scroll_offset_y: i64,
}

pub struct ScreencastSession {
    router: Weak<Router>,
    generation: u64,
    config: ScreencastConfig,
    frame_id: Mutex<i64>,
    acked: Mutex<HashSet<i64>>,
    metrics: Mutex<DeviceMetrics>,
    cancelled: AtomicBool,
    handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ScreencastSession {
    pub fn new(router: &Arc<Router>, generation: u64, config: ScreencastConfig) -> Arc<Self> {
        Arc::new(Self {
            router: Arc::downgrade(router),
            generation,
            config,
            frame_id: Mutex::new(1),
            acked: Mutex::new(HashSet::new()),
            metrics: Mutex::new(DeviceMetrics::default()),
            cancelled: AtomicBool::new(false),
        handle: Mutex::new(None),
        })
    }

    /// §4.3 "Start": fixes viewport dimensions, then begins the periodic task.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(err) = this.fix_viewport().await {
                log::warn!("screencast viewport probe failed: {err}");
                return;
            }
            let mut ticker = tokio::time::interval(this.config.frame_interval);
            loop {
                ticker.tick().await;
                if this.cancelled.load(Ordering::SeqCst) {
                    return;
                }
                if let Err(err) = this.tick().await {
                    log::warn!("screencast tick failed: {err}");
                }
            }
        });
        *self.handle.lock().unwrap() = Some(handle);
    }

    async fn fix_viewport(self: &Arc<Self>) -> Result<()> {
        let Some(router) = self.router.upgrade() else { return Ok(()) };
        let result = router
            .call_device(
                "Runtime.evaluate",
                json!({
                    "expression": "(window.innerWidth > 0 ? window.innerWidth : screen.width) + \",\" + (window.innerHeight > 0 ? window.innerHeight : screen.height) + \",\" + window.devicePixelRatio",
                }),
            )
            .await?;
        let parts = csv_parts(&result);
        let mut metrics = self.metrics.lock().unwrap();
        metrics.device_width = parts.first().copied().unwrap_or_default();
        metrics.device_height = parts.get(1).copied().unwrap_or_default();
        metrics.page_scale_factor = parts.get(2).copied().unwrap_or(1);
        Ok(())
    }

    /// §4.3 "Periodic task (the pacing rule)".
    async fn tick(self: &Arc<Self>) -> Result<()> {
        let Some(router) = self.router.upgrade() else { return Ok(()) };
        if router.current_generation() != self.generation {
            return Ok(());
        }

        let current_frame = {
            let mut frame_id = self.frame_id.lock().unwrap();
            let f = *frame_id;
            if f > 1 && !self.acked.lock().unwrap().contains(&(f - 1)) {
                return Ok(());
            }
            *frame_id = f + 1;
            f
        };

        let offsets = router
            .call_device(
                "Runtime.evaluate",
                json!({ "expression": "window.document.body.offsetTop + \",\" + window.pageXOffset + \",\" + window.pageYOffset" }),
            )
            .await?;
        if offsets.get("wasThrown").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Ok(());
        }
        let parts = csv_parts(&offsets);
        let (device_width, device_height, page_scale_factor) = {
            let mut metrics = self.metrics.lock().unwrap();
            metrics.offset_top = parts.first().copied().unwrap_or_default();
            metrics.scroll_offset_x = parts.get(1).copied().unwrap_or_default();
            metrics.scroll_offset_y = parts.get(2).copied().unwrap_or_default();
            (metrics.device_width, metrics.device_height, metrics.page_scale_factor)
        };

        let snapshot = router
            .call_device(
                "Page.snapshotRect",
                json!({ "x": 0, "y": 0, "width": device_width, "height": device_height, "coordinateSystem": "Viewport" }),
            )
            .await?;
        let data_url = snapshot.get("dataURL").and_then(|v| v.as_str()).unwrap_or_default();
        let data = match data_url.find("base64") {
            Some(index) => &data_url[index + "base64".len() + 1..],
            None => data_url,
        };

        if router.current_generation() != self.generation {
            return Ok(());
        }

        let (offset_top, scroll_offset_x, scroll_offset_y) = {
            let metrics = self.metrics.lock().unwrap();
            (metrics.offset_top, metrics.scroll_offset_x, metrics.scroll_offset_y)
        };
        let event = crate::envelope::event(
            "Page.screencastFrame",
            json!({
                "data": data,
                "metadata": {
                    "pageScaleFactor": page_scale_factor,
                    "offsetTop": offset_top,
                    "deviceWidth": device_width,
                    "deviceHeight": device_height,
                    "scrollOffsetX": scroll_offset_x,
                    "scrollOffsetY": scroll_offset_y,
                    "timestamp": crate::time::now_nanos(),
                },
                "sessionId": current_frame,
            }),
        )?;
        router.send_to_frontend(event).await
    }

    /// §4.3 "Ack".
    pub fn ack_frame(&self, frame_number: i64) {
        self.acked.lock().unwrap().insert(frame_number);
    }

    /// §4.3 "Stop": cancels the ticker deterministically.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
        }
    }
}

fn csv_parts(value: &serde_json::Value) -> Vec<i64> {
    value
        .get("result")
        .and_then(|r| r.get("value"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .split(',')
        .map(|part| part.trim().parse::<i64>().unwrap_or_default())
        .collect()
}
