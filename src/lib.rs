//! portkeep: keep a NAT-PMP port mapping alive over a VPN
//!
//! This crate holds one public port lease against a NAT-PMP gateway (the
//! ProtonVPN port forwarding setup), refreshes it on a timer, restarts
//! dependent applications when the mapped port changes, and offers a
//! live status display plus one-shot diagnostic modes.
//!
//! # Architecture
//!
//! - **Probe**: external NAT-PMP helper invocation and result parsing
//! - **Lifecycle**: the acquisition/refresh state machine and its
//!   published status snapshots
//! - **Apps**: catalog and controller for dependent applications
//! - **Netmon**: interface detection, transfer rates, diagnostics
//! - **TUI**: read-only live status display over the lifecycle state
//! - **Config**: hierarchical TOML configuration with embedded defaults

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod apps;
pub mod cli;
pub mod cli_handler;
pub mod config;
pub mod journal;
pub mod lifecycle;
pub mod netmon;
pub mod orchestrator;
pub mod probe;
pub mod tui;
