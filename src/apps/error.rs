//! Application control error types.
//!
//! Action failures are tolerated per application: the controller logs
//! them and keeps processing the rest of the batch, so these types exist
//! for reporting, not for propagation.

use std::time::Duration;
use thiserror::Error;

/// Why a single action command did not complete.
#[derive(Debug, Error)]
pub enum ActionFailure {
    /// The command ran but exited non-zero.
    #[error("exited with status {status}: {stderr}")]
    NonZero {
        /// Exit status code (-1 when killed by a signal).
        status: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The command exceeded the action timeout.
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The command could not be spawned.
    #[error("failed to spawn: {0}")]
    Spawn(#[from] std::io::Error),
}

/// An action failure with the application and action attached.
#[derive(Debug, Error)]
pub enum AppError {
    /// One application's action failed.
    #[error("{action} action for '{app}' failed: {source}")]
    Action {
        /// Application the action belonged to.
        app: String,
        /// Which action: start, stop or configure.
        action: &'static str,
        /// What went wrong.
        source: ActionFailure,
    },
}
