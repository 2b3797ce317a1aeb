//! Start, stop and configure actions for dependent applications.
//!
//! Every action is an external command from the catalog, run to
//! completion under a timeout. Unknown names and failing actions are
//! logged and skipped; a batch never aborts halfway. Restart ordering
//! (stop, settle, configure, start) is the lifecycle's responsibility,
//! the controller only provides the three operations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::catalog::{expand_args, AppCatalog};
use super::error::{ActionFailure, AppError};
use crate::config::{AppAction, AppEntry};
use crate::journal::ActivityJournal;

/// Bound on a single application action command.
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Executes one prepared action command.
///
/// The production implementation spawns the real process; tests inject a
/// recorder to observe ordering and arguments.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Run the command to completion.
    async fn run(&self, program: &str, args: &[String]) -> Result<(), ActionFailure>;
}

/// Runner that spawns real processes under [`ACTION_TIMEOUT`].
pub struct SystemRunner;

#[async_trait]
impl ActionRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<(), ActionFailure> {
        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);

        let output = tokio::select! {
            result = command.output() => result?,
            () = tokio::time::sleep(ACTION_TIMEOUT) => {
                return Err(ActionFailure::Timeout(ACTION_TIMEOUT));
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(ActionFailure::NonZero {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Sequences catalog actions for named applications.
pub struct AppController {
    catalog: AppCatalog,
    runner: Arc<dyn ActionRunner>,
    journal: Arc<ActivityJournal>,
}

impl AppController {
    /// Controller that runs real commands.
    #[must_use]
    pub fn new(catalog: AppCatalog, journal: Arc<ActivityJournal>) -> Self {
        Self::with_runner(catalog, journal, Arc::new(SystemRunner))
    }

    /// Controller with an injected runner (for tests).
    #[must_use]
    pub fn with_runner(
        catalog: AppCatalog,
        journal: Arc<ActivityJournal>,
        runner: Arc<dyn ActionRunner>,
    ) -> Self {
        Self {
            catalog,
            runner,
            journal,
        }
    }

    /// The catalog this controller selects from.
    #[must_use]
    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    /// Start every named application.
    pub async fn start_all(&self, names: &[String]) {
        for entry in self.selected(names) {
            self.run_action(entry, "start", &entry.start, None).await;
        }
    }

    /// Stop every named application.
    pub async fn stop_all(&self, names: &[String]) {
        for entry in self.selected(names) {
            self.run_action(entry, "stop", &entry.stop, None).await;
        }
    }

    /// Write `port` into every named application's settings store.
    pub async fn configure_port(&self, names: &[String], port: u16) {
        for entry in self.selected(names) {
            self.run_action(entry, "configure", &entry.configure, Some(port))
                .await;
        }
    }

    /// Resolve names against the catalog, warning about unknown ones.
    fn selected(&self, names: &[String]) -> Vec<&AppEntry> {
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            match self.catalog.get(name) {
                Some(entry) => entries.push(entry),
                None => {
                    warn!(app = %name, "Unknown application, skipping");
                    self.journal
                        .warn(format!("Unknown application '{name}', skipping"));
                }
            }
        }
        entries
    }

    /// Run one action, logging failure instead of propagating it.
    async fn run_action(
        &self,
        entry: &AppEntry,
        label: &'static str,
        action: &AppAction,
        port: Option<u16>,
    ) {
        let args = expand_args(
            &action.args,
            &entry.launch_target,
            &entry.config_namespace,
            port,
        );
        debug!(app = %entry.name, action = label, program = %action.program, "Running app action");

        match self.runner.run(&action.program, &args).await {
            Ok(()) => {
                info!(app = %entry.name, action = label, "App action completed");
            }
            Err(failure) => {
                let err = AppError::Action {
                    app: entry.name.clone(),
                    action: label,
                    source: failure,
                };
                warn!(error = %err, "App action failed, continuing batch");
                self.journal.warn(err.to_string());
            }
        }
    }
}

/// Bound on the `pgrep` running check.
pub const RUNNING_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort running check for the app listing mode.
///
/// A wedged or missing `pgrep` reports "not running" after
/// [`RUNNING_CHECK_TIMEOUT`] instead of stalling the listing.
pub async fn is_running(entry: &AppEntry) -> bool {
    command_succeeds_within(
        "pgrep",
        &["-f", entry.process_pattern()],
        RUNNING_CHECK_TIMEOUT,
    )
    .await
}

/// Run a command and report whether it exited zero within `limit`.
async fn command_succeeds_within(program: &str, args: &[&str], limit: Duration) -> bool {
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    match tokio::time::timeout(limit, command.output()).await {
        Ok(Ok(output)) => output.status.success(),
        _ => false,
    }
}
