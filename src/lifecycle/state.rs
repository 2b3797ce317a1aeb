//! Shared lifecycle state published to the status display.
//!
//! The refresher is the only writer: it mutates its private copy and
//! publishes a complete [`StatusSnapshot`] through a watch channel, so
//! readers always observe a consistent record and never block the loop.

use chrono::{DateTime, Utc};

/// Number of recent port values kept for the history panel.
pub const PORT_HISTORY_CAPACITY: usize = 8;

/// Phase of the port lifecycle state machine.
///
/// Transitions only move forward: `Initializing -> Acquiring -> Steady ->
/// ShuttingDown`. A refresh failure never regresses `Steady` back to
/// `Acquiring`; `ShuttingDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Detecting the VPN interface before the first query.
    Initializing,
    /// Trying to obtain the first mapping.
    Acquiring,
    /// Holding a lease, refreshing on a timer.
    Steady,
    /// Tearing down; no further transitions.
    ShuttingDown,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecyclePhase::Initializing => write!(f, "initializing"),
            LifecyclePhase::Acquiring => write!(f, "acquiring"),
            LifecyclePhase::Steady => write!(f, "steady"),
            LifecyclePhase::ShuttingDown => write!(f, "shutting down"),
        }
    }
}

/// What a probe result meant for the held lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortObservation {
    /// First successful acquisition.
    First,
    /// Same port as before.
    Unchanged,
    /// The mapped port moved.
    Changed {
        /// Port held before this observation.
        previous: u16,
    },
}

/// The held port mapping and its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortLease {
    /// Currently mapped public port. `None` only before the first
    /// successful acquisition.
    pub current_port: Option<u16>,
    /// When the first acquisition succeeded.
    pub acquired_at: Option<DateTime<Utc>>,
    /// Distinct port values observed after the first acquisition.
    pub change_count: u32,
    /// When the port last changed (set by the first acquisition too).
    pub last_change_at: Option<DateTime<Utc>>,
}

impl PortLease {
    /// Fold a successful probe result into the lease.
    ///
    /// `change_count` increments exactly once per distinct port value
    /// after the first acquisition; an identical port never counts.
    pub fn observe(&mut self, port: u16, now: DateTime<Utc>) -> PortObservation {
        match self.current_port {
            None => {
                self.current_port = Some(port);
                self.acquired_at = Some(now);
                self.change_count = 0;
                self.last_change_at = Some(now);
                PortObservation::First
            }
            Some(current) if current == port => PortObservation::Unchanged,
            Some(previous) => {
                self.current_port = Some(port);
                self.change_count += 1;
                self.last_change_at = Some(now);
                PortObservation::Changed { previous }
            }
        }
    }
}

/// One observed port value, for the history panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortChange {
    /// The mapped public port.
    pub port: u16,
    /// When it was first observed.
    pub at: DateTime<Utc>,
}

/// Everything the status display needs, replaced atomically per update.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Current state machine phase.
    pub phase: LifecyclePhase,
    /// The held lease.
    pub lease: PortLease,
    /// Gateway being queried.
    pub gateway: String,
    /// Detected VPN interface, if any.
    pub interface: Option<String>,
    /// Latest inbound rate in bits per second.
    pub input_bps: Option<f64>,
    /// Latest outbound rate in bits per second.
    pub output_bps: Option<f64>,
    /// When the lifecycle started.
    pub started_at: DateTime<Utc>,
    /// When the next steady refresh is due.
    pub next_refresh_at: Option<DateTime<Utc>>,
    /// Recent port values, newest first.
    pub history: Vec<PortChange>,
    /// Attempts made during initial acquisition.
    pub acquire_attempts: u32,
}

impl StatusSnapshot {
    /// Snapshot for a lifecycle that has not done anything yet.
    #[must_use]
    pub fn initial(gateway: String) -> Self {
        Self {
            phase: LifecyclePhase::Initializing,
            lease: PortLease::default(),
            gateway,
            interface: None,
            input_bps: None,
            output_bps: None,
            started_at: Utc::now(),
            next_refresh_at: None,
            history: Vec::new(),
            acquire_attempts: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_sets_lease() {
        let mut lease = PortLease::default();
        let now = Utc::now();

        let observation = lease.observe(43210, now);

        assert_eq!(observation, PortObservation::First);
        assert_eq!(lease.current_port, Some(43210));
        assert_eq!(lease.acquired_at, Some(now));
        assert_eq!(lease.change_count, 0);
        assert_eq!(lease.last_change_at, Some(now));
    }

    #[test]
    fn test_identical_port_never_counts() {
        let mut lease = PortLease::default();
        let t0 = Utc::now();

        lease.observe(43210, t0);
        for _ in 0..5 {
            assert_eq!(lease.observe(43210, Utc::now()), PortObservation::Unchanged);
        }

        assert_eq!(lease.change_count, 0);
        assert_eq!(lease.last_change_at, Some(t0));
    }

    #[test]
    fn test_changed_port_counts_once_each() {
        let mut lease = PortLease::default();

        lease.observe(100, Utc::now());
        assert_eq!(
            lease.observe(200, Utc::now()),
            PortObservation::Changed { previous: 100 }
        );
        assert_eq!(lease.change_count, 1);

        assert_eq!(lease.observe(200, Utc::now()), PortObservation::Unchanged);
        assert_eq!(lease.change_count, 1);

        assert_eq!(
            lease.observe(100, Utc::now()),
            PortObservation::Changed { previous: 200 }
        );
        assert_eq!(lease.change_count, 2);
    }

    #[test]
    fn test_default_lease_has_no_port() {
        let lease = PortLease::default();
        assert_eq!(lease.current_port, None);
        assert_eq!(lease.acquired_at, None);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(LifecyclePhase::Steady.to_string(), "steady");
        assert_eq!(LifecyclePhase::ShuttingDown.to_string(), "shutting down");
    }
}
