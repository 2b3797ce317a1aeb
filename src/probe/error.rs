//! Probe error types.

use std::time::Duration;
use thiserror::Error;

/// Errors from a NAT-PMP query.
///
/// Only [`ProbeError::ToolMissing`] is fatal; everything else is transient
/// and handled by the lifecycle retry policies.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The external NAT-PMP helper could not be located.
    #[error("NAT-PMP helper '{0}' not found")]
    ToolMissing(String),

    /// The helper did not finish within the allowed time.
    #[error("NAT-PMP query timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The helper ran but exited non-zero.
    #[error("NAT-PMP helper exited with status {status}: {stderr}")]
    ToolError {
        /// Exit status code (-1 when killed by a signal).
        status: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The helper's output did not match the expected format.
    #[error("Could not parse NAT-PMP helper output: {0}")]
    ParseError(String),

    /// The helper process could not be spawned.
    #[error("Failed to run NAT-PMP helper: {0}")]
    Spawn(#[source] std::io::Error),
}

impl ProbeError {
    /// Whether this failure should abort the process rather than be retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeError::ToolMissing(_))
    }
}
