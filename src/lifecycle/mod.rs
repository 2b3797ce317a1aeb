//! The port lifecycle state machine.
//!
//! `Initializing -> Acquiring -> Steady -> ShuttingDown`, driven by one
//! task that owns the lease and publishes read-only snapshots for the
//! status display. The phases and their policies live in
//! [`PortRefresher`]; [`PortLease`] and [`StatusSnapshot`] are the data
//! it maintains and publishes.

mod error;
mod refresher;
mod state;

pub use error::LifecycleError;
pub use refresher::{LifecycleHandle, PortRefresher, RefreshSettings};
pub use state::{
    LifecyclePhase, PortChange, PortLease, PortObservation, StatusSnapshot, PORT_HISTORY_CAPACITY,
};
