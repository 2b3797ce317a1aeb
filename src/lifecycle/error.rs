//! Lifecycle error types.

use thiserror::Error;

use crate::probe::ProbeError;

/// Fatal outcomes of the lifecycle loop.
///
/// Transient probe failures never surface here; they are retried or
/// logged inside the loop. What remains is the initial acquisition
/// giving up, or the helper tool being unusable.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Initial acquisition exhausted its retry count or time budget.
    #[error("no port mapping acquired after {attempts} attempts over {elapsed_secs}s")]
    AcquisitionFailed {
        /// Probe attempts made before giving up.
        attempts: u32,
        /// Wall-clock seconds spent acquiring.
        elapsed_secs: u64,
    },

    /// The NAT-PMP helper is unusable.
    #[error(transparent)]
    Probe(#[from] ProbeError),
}
