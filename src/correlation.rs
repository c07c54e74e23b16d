//! The three thread-safe correlation tables (§3) that let the router match
//! device replies back to whoever is waiting on them, modeled on the single
//! `callbacks: HashMap<i32, WaitPlaces<..>>` table the teacher crate keeps in
//! `imp::core::connection::Context` — split in three here because the proxy
//! has two distinct kinds of waiter (the front-end itself, and a filter's
//! own synthetic call) plus a buffer for frames that arrive before either
//! side is ready.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

use serde_json::Value;

/// Either side of a device response: `Ok` for `result`, `Err` for `error`.
pub type DeviceReply = Result<Value, Value>;

/// `FrontendPending`: front-end id -> original method name.
///
/// Invariant: an id is present here iff the proxy is still awaiting a
/// device reply on behalf of that front-end request (§8 invariant 1).
#[derive(Debug, Default)]
pub struct FrontendPending {
    inner: Mutex<HashMap<i64, String>>,
}

impl FrontendPending {
    pub fn insert(&self, id: i64, method: String) {
        self.inner.lock().unwrap().insert(id, method);
    }

    /// Removes and returns the original method name, if `id` was pending.
    pub fn take(&self, id: i64) -> Option<String> {
        self.inner.lock().unwrap().remove(&id)
    }

    #[cfg(test)]
    pub fn contains(&self, id: i64) -> bool {
        self.inner.lock().unwrap().contains_key(&id)
    }
}

/// `SyntheticPending`: synthetic id (always negative, §3) -> the
/// [`oneshot::Sender`] half of the continuation awaiting that id's reply.
#[derive(Debug, Default)]
pub struct SyntheticPending {
    inner: Mutex<HashMap<i64, oneshot::Sender<DeviceReply>>>,
}

impl SyntheticPending {
    pub fn insert(&self, id: i64, tx: oneshot::Sender<DeviceReply>) {
        self.inner.lock().unwrap().insert(id, tx);
    }

    /// Removes the continuation for `id`, if any is still pending.
    pub fn take(&self, id: i64) -> Option<oneshot::Sender<DeviceReply>> {
        self.inner.lock().unwrap().remove(&id)
    }

    /// Drains every pending continuation without invoking it (session
    /// teardown, §4.1 "Failure semantics": continuations are discarded, not
    /// invoked, when the session ends).
    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

/// Strictly-decreasing synthetic id allocator, starting at 0 and counting
/// down (§3: "synthetic ids ... strictly decreasing from 0").
#[derive(Debug, Default)]
pub struct SyntheticIds {
    next: Mutex<i64>,
}

impl SyntheticIds {
    pub fn next(&self) -> i64 {
        let mut next = self.next.lock().unwrap();
        *next -= 1;
        *next
    }
}

/// `PreconnectBuffer`: raw front-end frames received before the device
/// transport is ready, replayed in FIFO order once it connects (§4.1).
#[derive(Debug, Default)]
pub struct PreconnectBuffer {
    inner: Mutex<Option<Vec<String>>>,
}

impl PreconnectBuffer {
    /// Starts buffering. Call once, before the device transport exists.
    pub fn open(&self) {
        *self.inner.lock().unwrap() = Some(Vec::new());
    }

    /// Appends a frame if still buffering, consuming it (returns `None`,
    /// meaning the caller has nothing further to do). Once the buffer is
    /// drained this hands the frame straight back (`Some(raw)`) so the
    /// caller can process it directly instead.
    pub fn push_if_open(&self, raw: String) -> Option<String> {
        let mut guard = self.inner.lock().unwrap();
        match guard.as_mut() {
            Some(buf) => {
                buf.push(raw);
                None
            }
            None => Some(raw),
        }
    }

    /// Drains and returns every buffered frame in FIFO order, closing the
    /// buffer so subsequent frames are handled directly.
    pub fn drain(&self) -> Vec<String> {
        self.inner.lock().unwrap().take().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_ids_strictly_decrease_from_zero() {
        let ids = SyntheticIds::default();
        assert_eq!(ids.next(), -1);
        assert_eq!(ids.next(), -2);
        assert_eq!(ids.next(), -3);
    }

    #[test]
    fn preconnect_buffer_fifo_drain() {
        let buf = PreconnectBuffer::default();
        buf.open();
        assert!(buf.push_if_open("a".into()).is_none());
        assert!(buf.push_if_open("b".into()).is_none());
        assert_eq!(buf.drain(), vec!["a".to_string(), "b".to_string()]);
        // Once drained, the buffer hands frames straight back.
        assert_eq!(buf.push_if_open("c".into()), Some("c".to_string()));
    }

    #[test]
    fn frontend_pending_tracks_presence() {
        let pending = FrontendPending::default();
        pending.insert(7, "Log.enable".into());
        assert!(pending.contains(7));
        assert_eq!(pending.take(7), Some("Log.enable".to_string()));
        assert!(!pending.contains(7));
    }
}
