/// Errors surfaced by the router, rule handlers and screencast session.
///
/// Decode and translation failures are not fatal to the session (§7 of the
/// spec): the router logs them and drops the offending frame. Only
/// [`Error::Transport`] and [`Error::SessionClosed`] end the session.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] crate::transport::TransportError),

    #[error("malformed envelope: {0}")]
    Decode(String),

    #[error("rule handler for {method} expected {expected}")]
    Translation { method: String, expected: &'static str },

    #[error("no synthetic call pending for id {0}")]
    CallbackNotFound(i64),

    #[error("device call for {0:?} was dropped before it replied")]
    CallCancelled(Option<String>),

    #[error("device returned an error response: {0:?}")]
    DeviceError(serde_json::Value),

    #[error("session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
