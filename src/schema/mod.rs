//! Typed WebKit Inspector Protocol entities (§9 "two JSON strategies").
//!
//! Only the fields a rule handler reads, writes, or restructures are given a
//! typed struct here, modeled on `entity/WebKitProtocol/*.go`; every other
//! payload (console messages, DOM node trees, runtime remote objects passed
//! straight through) stays a `serde_json::Value`/`Map<String, Value>` and is
//! patched by path, matching how the original adapter (`gjson`/`sjson`)
//! treats the wire format as semi-structured rather than fully typed.

pub mod css;
pub mod dom;
pub mod target;
