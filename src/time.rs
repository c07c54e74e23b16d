//! Timestamp helper shared by the screencast loop and the `Console.messageAdded`
//! -> `Log.entryAdded` reshape (§4.2e), both of which stamp `timestamp: now`.

pub fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}
