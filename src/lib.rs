//! A protocol-translation proxy mediating between a Chrome DevTools
//! Protocol front-end and a WebKit Inspector Protocol device (§1, §2).
//!
//! [`Session::start`] is the entry point: give it a front-end [`Transport`],
//! a device `Transport`, and a [`SessionConfig`] (device OS version string
//! plus screencast defaults), and it builds the right rule pack, attaches
//! the device, and spawns the reader tasks that keep frames flowing in both
//! directions.

pub mod correlation;
pub mod envelope;
pub mod error;
pub mod router;
pub mod rules;
pub mod schema;
pub mod screencast;
pub mod session;
pub mod state;
pub mod time;
pub mod transport;
pub mod version;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use router::Router;
pub use session::{Session, SessionConfig};
pub use transport::{Transport, TransportError};
pub use version::DeviceVersion;
