//! The port lifecycle loop.
//!
//! One task owns the whole state machine: initial acquisition with
//! bounded retries, the steady refresh timer, change detection and the
//! dependent-application restart sequence. Every piece of state the
//! status display needs is published as a complete [`StatusSnapshot`]
//! through a watch channel, and every wait races the cancellation token
//! so a stop request is observed within a second.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::LifecycleError;
use super::state::{
    LifecyclePhase, PortChange, PortObservation, StatusSnapshot, PORT_HISTORY_CAPACITY,
};
use crate::apps::AppController;
use crate::journal::ActivityJournal;
use crate::netmon::{detect_vpn_interface, read_interface_counters, RateTracker};
use crate::probe::Prober;

/// Timing and retry policy for the lifecycle loop.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Pause between steady-state refreshes.
    pub refresh_interval: Duration,
    /// Probe attempts allowed during initial acquisition.
    pub acquire_max_attempts: u32,
    /// Wall-clock budget for initial acquisition.
    pub acquire_budget: Duration,
    /// Pause between failed acquisition attempts.
    pub acquire_backoff: Duration,
    /// Extra pause after a failed steady-state refresh.
    pub failure_wait: Duration,
    /// Pause between stopping applications and reconfiguring them.
    pub settle_interval: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(45),
            acquire_max_attempts: 10,
            acquire_budget: Duration::from_secs(300),
            acquire_backoff: Duration::from_secs(30),
            failure_wait: Duration::from_secs(30),
            settle_interval: Duration::from_secs(30),
        }
    }
}

/// Reader-side handles for a running lifecycle.
pub struct LifecycleHandle {
    /// Latest published snapshot.
    pub snapshot: watch::Receiver<StatusSnapshot>,
    /// Sender that advances the next steady refresh early.
    pub refresh: mpsc::Sender<()>,
}

/// How an interruptible wait ended.
enum WaitOutcome {
    Elapsed,
    Poked,
    Cancelled,
}

/// The lifecycle task: sole writer of the lease and snapshot.
pub struct PortRefresher {
    probe: Arc<dyn Prober>,
    controller: AppController,
    controlled: Vec<String>,
    journal: Arc<ActivityJournal>,
    settings: RefreshSettings,
    cancel: CancellationToken,
    snapshot_tx: watch::Sender<StatusSnapshot>,
    refresh_rx: mpsc::Receiver<()>,
    snapshot: StatusSnapshot,
    rates: RateTracker,
    apps_started: bool,
}

impl PortRefresher {
    /// Build a refresher and the handles its readers use.
    ///
    /// `controlled` names the catalog entries to restart on port changes;
    /// an empty list disables application control entirely.
    pub fn new(
        probe: Arc<dyn Prober>,
        controller: AppController,
        controlled: Vec<String>,
        journal: Arc<ActivityJournal>,
        settings: RefreshSettings,
        gateway: String,
        cancel: CancellationToken,
    ) -> (Self, LifecycleHandle) {
        let snapshot = StatusSnapshot::initial(gateway);
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot.clone());
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let refresher = Self {
            probe,
            controller,
            controlled,
            journal,
            settings,
            cancel,
            snapshot_tx,
            refresh_rx,
            snapshot,
            rates: RateTracker::new(),
            apps_started: false,
        };
        let handle = LifecycleHandle {
            snapshot: snapshot_rx,
            refresh: refresh_tx,
        };
        (refresher, handle)
    }

    /// Drive the state machine to completion.
    ///
    /// Returns `Ok(())` on a clean stop; `Err` only when initial
    /// acquisition gives up or the helper tool turns out to be unusable.
    /// Application teardown runs on every exit path.
    pub async fn run(mut self) -> Result<(), LifecycleError> {
        self.initialize().await;

        match self.acquire().await {
            Ok(true) => {
                self.steady().await;
                self.shutdown().await;
                Ok(())
            }
            Ok(false) => {
                self.shutdown().await;
                Ok(())
            }
            Err(e) => {
                self.shutdown().await;
                Err(e)
            }
        }
    }

    /// Detect the VPN interface and move to `Acquiring`.
    ///
    /// Detection is best-effort: absence only disables the rate display.
    async fn initialize(&mut self) {
        info!(gateway = %self.snapshot.gateway, "Port lifecycle starting");
        self.journal
            .info(format!("Monitoring gateway {}", self.snapshot.gateway));

        let interface = detect_vpn_interface(&self.snapshot.gateway).await;
        match &interface {
            Some(name) => {
                info!(interface = %name, "VPN interface detected");
                self.journal.info(format!("VPN interface: {name}"));
            }
            None => {
                warn!("No VPN interface detected, rate display disabled");
                self.journal
                    .warn("No VPN interface detected, rate display disabled");
            }
        }
        self.snapshot.interface = interface;
        self.snapshot.phase = LifecyclePhase::Acquiring;
        self.publish();
    }

    /// Obtain the first mapping under the retry and time budget.
    ///
    /// Returns `Ok(true)` once a lease is held, `Ok(false)` when
    /// cancelled first, `Err` when the budget runs out.
    async fn acquire(&mut self) -> Result<bool, LifecycleError> {
        let started = tokio::time::Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(false);
            }

            attempts += 1;
            self.snapshot.acquire_attempts = attempts;
            self.publish();
            debug!(attempts, "Requesting initial port mapping");

            match self.probe.acquire().await {
                Ok(port) => {
                    let elapsed_secs = started.elapsed().as_secs();
                    info!(port, attempts, elapsed_secs, "Acquired initial port mapping");
                    self.journal
                        .info(format!("Acquired public port {port} (attempt {attempts})"));
                    self.record_port(port);

                    if !self.controlled.is_empty() {
                        self.journal
                            .info(format!("Configuring applications for port {port}"));
                        self.controller.configure_port(&self.controlled, port).await;
                        self.controller.start_all(&self.controlled).await;
                        self.apps_started = true;
                    }

                    self.snapshot.phase = LifecyclePhase::Steady;
                    self.publish();
                    return Ok(true);
                }
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "NAT-PMP helper unavailable");
                    self.journal.error(e.to_string());
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, attempts, "Acquisition attempt failed");
                    self.journal
                        .warn(format!("Acquisition attempt {attempts} failed: {e}"));

                    let elapsed = started.elapsed();
                    if attempts >= self.settings.acquire_max_attempts
                        || elapsed >= self.settings.acquire_budget
                    {
                        let elapsed_secs = elapsed.as_secs();
                        error!(attempts, elapsed_secs, "Giving up on initial acquisition");
                        self.journal.error(format!(
                            "Giving up after {attempts} attempts over {elapsed_secs}s"
                        ));
                        return Err(LifecycleError::AcquisitionFailed {
                            attempts,
                            elapsed_secs,
                        });
                    }

                    if matches!(
                        self.wait(self.settings.acquire_backoff, false).await,
                        WaitOutcome::Cancelled
                    ) {
                        return Ok(false);
                    }
                }
            }
        }
    }

    /// The steady-state refresh loop; runs until cancelled.
    ///
    /// A failed refresh never leaves `Steady`: the held lease and the
    /// running applications stay untouched and the next tick retries.
    async fn steady(&mut self) {
        loop {
            self.snapshot.next_refresh_at = Some(
                Utc::now()
                    + chrono::Duration::seconds(self.settings.refresh_interval.as_secs() as i64),
            );
            self.publish();

            match self.wait(self.settings.refresh_interval, true).await {
                WaitOutcome::Cancelled => return,
                WaitOutcome::Poked => {
                    info!("Manual refresh requested");
                    self.journal.info("Manual refresh requested");
                }
                WaitOutcome::Elapsed => {}
            }

            self.sample_rates();

            match self.probe.acquire().await {
                Ok(port) => match self.record_port(port) {
                    PortObservation::Unchanged => {
                        debug!(port, "Mapped port unchanged");
                        self.publish();
                    }
                    PortObservation::Changed { previous } => {
                        info!(
                            previous,
                            port,
                            changes = self.snapshot.lease.change_count,
                            "Mapped port changed"
                        );
                        self.journal
                            .info(format!("Port changed {previous} -> {port}"));
                        if self.apps_started && !self.restart_apps(port).await {
                            // Cancelled mid-restart; teardown handles the rest.
                            return;
                        }
                        self.publish();
                    }
                    PortObservation::First => self.publish(),
                },
                Err(e) => {
                    warn!(error = %e, "Refresh probe failed, keeping current lease");
                    self.journal.warn(format!("Refresh failed: {e}"));
                    if matches!(
                        self.wait(self.settings.failure_wait, false).await,
                        WaitOutcome::Cancelled
                    ) {
                        return;
                    }
                }
            }
        }
    }

    /// Stop, settle, reconfigure and restart the controlled applications.
    ///
    /// Returns `false` when cancelled during the settle pause.
    async fn restart_apps(&mut self, port: u16) -> bool {
        info!(port, "Restarting dependent applications");
        self.journal
            .info(format!("Restarting applications for port {port}"));

        self.controller.stop_all(&self.controlled).await;
        if matches!(
            self.wait(self.settings.settle_interval, false).await,
            WaitOutcome::Cancelled
        ) {
            return false;
        }
        self.controller.configure_port(&self.controlled, port).await;
        self.controller.start_all(&self.controlled).await;

        self.journal.info("Applications restarted");
        true
    }

    /// Terminal phase: publish it and tear down applications.
    async fn shutdown(&mut self) {
        self.snapshot.phase = LifecyclePhase::ShuttingDown;
        self.snapshot.next_refresh_at = None;
        self.publish();
        info!("Port lifecycle shutting down");
        self.journal.info("Shutting down");

        if self.apps_started {
            self.journal.info("Stopping controlled applications");
            self.controller.stop_all(&self.controlled).await;
        }
    }

    /// Feed the interface counters into the rate tracker.
    fn sample_rates(&mut self) {
        let Some(interface) = self.snapshot.interface.clone() else {
            return;
        };
        match read_interface_counters(&interface) {
            Ok(counters) => {
                let (input, output) = self.rates.update(
                    counters.rx_bytes,
                    counters.tx_bytes,
                    std::time::Instant::now(),
                );
                self.snapshot.input_bps = input;
                self.snapshot.output_bps = output;
            }
            Err(e) => {
                debug!(error = %e, interface = %interface, "Counter read failed");
                self.snapshot.input_bps = None;
                self.snapshot.output_bps = None;
            }
        }
    }

    /// Fold a probed port into the lease and history.
    fn record_port(&mut self, port: u16) -> PortObservation {
        let now = Utc::now();
        let observation = self.snapshot.lease.observe(port, now);
        if !matches!(observation, PortObservation::Unchanged) {
            self.snapshot.history.insert(0, PortChange { port, at: now });
            self.snapshot.history.truncate(PORT_HISTORY_CAPACITY);
        }
        observation
    }

    /// Sleep that races the cancellation token and, optionally, the
    /// manual-refresh channel.
    async fn wait(&mut self, duration: Duration, mut allow_poke: bool) -> WaitOutcome {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return WaitOutcome::Cancelled,
                () = &mut sleep => return WaitOutcome::Elapsed,
                poke = self.refresh_rx.recv(), if allow_poke => match poke {
                    Some(()) => return WaitOutcome::Poked,
                    // Presenter gone; fall back to the timer alone.
                    None => allow_poke = false,
                },
            }
        }
    }

    /// Atomically replace the published snapshot.
    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot.clone());
    }
}
