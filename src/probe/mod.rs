//! NAT-PMP port probing.
//!
//! Wraps the external NAT-PMP helper command: resolves the binary once at
//! startup, runs it under a timeout for every query, and parses the mapped
//! public port out of its result line. Everything the helper can do wrong
//! is surfaced as a [`ProbeError`]; only a missing helper is fatal.

mod error;
mod natpmp;

pub use error::ProbeError;
pub use natpmp::{NatPmpProbe, Prober, PORT_FIELD_INDEX};
