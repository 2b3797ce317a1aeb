//! Task wiring and shutdown ordering.
//!
//! Spawns the lifecycle loop, an interrupt watcher and, in status mode,
//! the terminal display, all tied to one cancellation token. Shutdown
//! ordering: presenter exit cancels the token, the lifecycle observes it
//! and tears down applications, and the final join is bounded so
//! teardown can never wedge process exit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::apps::{AppCatalog, AppController};
use crate::cli::Cli;
use crate::config::Config;
use crate::journal::ActivityJournal;
use crate::lifecycle::{LifecycleError, PortRefresher, RefreshSettings};
use crate::probe::NatPmpProbe;
use crate::tui::{TuiApp, TuiRunner};

/// How long lifecycle teardown may run after cancellation.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(20);

/// Run the refresh loop, optionally with the live status display.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let journal = Arc::new(ActivityJournal::default());

    // Resolving the helper here makes a missing tool a startup error
    // instead of a failure on the first tick.
    let probe = NatPmpProbe::new(
        &config.general.natpmp_tool,
        &config.general.gateway,
        Duration::from_secs(config.general.probe_timeout_seconds),
    )
    .context("NAT-PMP helper is required")?;

    let controller =
        AppController::new(AppCatalog::from_entries(config.apps.clone()), journal.clone());

    let settings = RefreshSettings {
        refresh_interval: Duration::from_secs(config.general.refresh_seconds),
        ..RefreshSettings::default()
    };

    let cancel = CancellationToken::new();
    let (refresher, handle) = PortRefresher::new(
        Arc::new(probe),
        controller,
        cli.control.clone(),
        journal.clone(),
        settings,
        config.general.gateway.clone(),
        cancel.clone(),
    );

    let mut lifecycle = tokio::spawn(refresher.run());

    let interrupt_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
            interrupt_cancel.cancel();
        }
    });

    if cli.status {
        let render_interval = Duration::from_secs(config.general.status_refresh_seconds);
        let timeout = cli.status_timeout.map(Duration::from_secs);
        let app = TuiApp::new(
            handle.snapshot.clone(),
            journal.clone(),
            handle.refresh.clone(),
            render_interval,
            timeout,
        );

        let display = {
            let mut runner = TuiRunner::new().context("Failed to initialize status display")?;
            runner.run(app, cancel.clone()).await
            // Dropping the runner restores the terminal before any
            // shutdown logging reaches stderr.
        };
        // Presenter exit, however it happened, stops the lifecycle.
        cancel.cancel();
        join_lifecycle(&mut lifecycle, &cancel).await?;
        display.context("Status display failed")?;
        return Ok(());
    }

    join_lifecycle(&mut lifecycle, &cancel).await
}

/// Wait for the lifecycle task, bounding teardown after cancellation.
async fn join_lifecycle(
    lifecycle: &mut JoinHandle<Result<(), LifecycleError>>,
    cancel: &CancellationToken,
) -> Result<()> {
    if !cancel.is_cancelled() {
        tokio::select! {
            result = &mut *lifecycle => return finish(result),
            () = cancel.cancelled() => {}
        }
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, &mut *lifecycle).await {
        Ok(result) => finish(result),
        Err(_) => {
            warn!(
                grace_secs = SHUTDOWN_GRACE.as_secs(),
                "Teardown did not finish in time, abandoning it"
            );
            lifecycle.abort();
            Ok(())
        }
    }
}

fn finish(result: Result<Result<(), LifecycleError>, JoinError>) -> Result<()> {
    match result {
        Ok(Ok(())) => {
            info!("Clean stop");
            Ok(())
        }
        Ok(Err(e)) => Err(e).context("Port lifecycle failed"),
        Err(e) => Err(e).context("Lifecycle task failed"),
    }
}
