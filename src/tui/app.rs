//! Status display state.
//!
//! `TuiApp` is the read side of the lifecycle: it borrows snapshots from
//! the watch channel, copies the journal tail, and tracks the display's
//! own timers (render cadence, optional session timeout). Its only
//! influence on the lifecycle is the manual-refresh poke.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::journal::{ActivityJournal, JournalEntry};
use crate::lifecycle::StatusSnapshot;

/// Most journal entries the activity panel will show.
pub const LOG_TAIL: usize = 50;

/// State for one status display session.
pub struct TuiApp {
    snapshot: watch::Receiver<StatusSnapshot>,
    journal: Arc<ActivityJournal>,
    refresh_tx: mpsc::Sender<()>,
    render_interval: Duration,
    deadline: Option<Instant>,
    last_render: Option<Instant>,
    force_render: bool,
    should_quit: bool,
}

impl TuiApp {
    /// Build the display state over a running lifecycle.
    ///
    /// `timeout` bounds the whole session; when it elapses the display
    /// requests shutdown exactly as the quit key does.
    #[must_use]
    pub fn new(
        snapshot: watch::Receiver<StatusSnapshot>,
        journal: Arc<ActivityJournal>,
        refresh_tx: mpsc::Sender<()>,
        render_interval: Duration,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            snapshot,
            journal,
            refresh_tx,
            render_interval,
            deadline: timeout.map(|t| Instant::now() + t),
            last_render: None,
            force_render: true,
            should_quit: false,
        }
    }

    /// Latest lifecycle snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Newest journal entries for the activity panel.
    #[must_use]
    pub fn log_tail(&self) -> Vec<JournalEntry> {
        self.journal.tail(LOG_TAIL)
    }

    /// Ask the lifecycle to refresh now instead of on its next tick.
    pub fn request_refresh(&mut self) {
        // A full channel means a poke is already pending.
        if self.refresh_tx.try_send(()).is_ok() {
            debug!("Manual refresh poke sent");
        }
        self.force_render = true;
    }

    /// Mark the session as finished.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Whether the quit key has been pressed.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether the optional display timeout has elapsed.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Force a redraw on the next loop iteration.
    pub fn mark_dirty(&mut self) {
        self.force_render = true;
    }

    /// Whether a redraw is due, consuming the forced flag.
    pub fn take_render_due(&mut self) -> bool {
        let due = self.force_render
            || self
                .last_render
                .map_or(true, |t| t.elapsed() >= self.render_interval);
        if due {
            self.force_render = false;
            self.last_render = Some(Instant::now());
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(timeout: Option<Duration>) -> (TuiApp, mpsc::Receiver<()>) {
        let (_, snapshot_rx) = watch::channel(StatusSnapshot::initial("10.2.0.1".to_string()));
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let app = TuiApp::new(
            snapshot_rx,
            Arc::new(ActivityJournal::default()),
            refresh_tx,
            Duration::from_secs(5),
            timeout,
        );
        (app, refresh_rx)
    }

    #[test]
    fn test_quit_flag() {
        let (mut app, _rx) = test_app(None);
        assert!(!app.should_quit());
        app.quit();
        assert!(app.should_quit());
    }

    #[test]
    fn test_no_timeout_never_expires() {
        let (app, _rx) = test_app(None);
        assert!(!app.timed_out());
    }

    #[test]
    fn test_zero_timeout_expires_immediately() {
        let (app, _rx) = test_app(Some(Duration::ZERO));
        assert!(app.timed_out());
    }

    #[test]
    fn test_first_render_is_due_then_waits() {
        let (mut app, _rx) = test_app(None);

        assert!(app.take_render_due());
        // Interval has not elapsed and nothing forced a redraw
        assert!(!app.take_render_due());

        app.mark_dirty();
        assert!(app.take_render_due());
    }

    #[test]
    fn test_refresh_request_pokes_lifecycle() {
        let (mut app, mut rx) = test_app(None);

        app.request_refresh();
        assert_eq!(rx.try_recv(), Ok(()));

        // Repeated requests while one is pending do not pile up
        app.request_refresh();
        app.request_refresh();
        assert_eq!(rx.try_recv(), Ok(()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_snapshot_borrows_latest() {
        let (tx, snapshot_rx) = watch::channel(StatusSnapshot::initial("10.2.0.1".to_string()));
        let (refresh_tx, _refresh_rx) = mpsc::channel(1);
        let app = TuiApp::new(
            snapshot_rx,
            Arc::new(ActivityJournal::default()),
            refresh_tx,
            Duration::from_secs(5),
            None,
        );

        let mut updated = StatusSnapshot::initial("10.2.0.1".to_string());
        updated.acquire_attempts = 3;
        tx.send_replace(updated);

        assert_eq!(app.snapshot().acquire_attempts, 3);
    }
}
