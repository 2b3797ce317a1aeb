//! Network observation: interface counters, transfer rates, diagnostics.
//!
//! Everything here is read-only with respect to the network. The lifecycle
//! loop uses [`detect_vpn_interface`] and [`read_interface_counters`] to
//! feed the [`RateTracker`]; the one-shot CLI modes use the diagnostic
//! runners. All failures degrade gracefully: a missing interface or a
//! failing command never stops the port refresh loop.

mod counters;
mod diag;
mod error;
mod rate;

pub use counters::{
    detect_vpn_interface, read_interface_counters, route_to_gateway, InterfaceCounters,
    PROC_NET_DEV,
};
pub use diag::{
    connectivity_check, network_info, run_diagnostic, run_diagnostic_with_timeout,
    DiagnosticResult, DIAG_TIMEOUT,
};
pub use error::NetMonError;
pub use rate::{format_bps, RateTracker};
