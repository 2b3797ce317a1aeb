//! Network monitoring error types.

use thiserror::Error;

/// Errors from interface counter reads.
///
/// None of these are fatal: the lifecycle treats a failed counter read as
/// "no rate available this tick".
#[derive(Debug, Error)]
pub enum NetMonError {
    /// Failed to read a proc file.
    #[error("Failed to read {path}: {source}")]
    ReadError {
        /// Path that couldn't be read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Counter file content did not match the expected format.
    #[error("Could not parse interface counters: {0}")]
    ParseError(String),

    /// The monitored interface is not listed.
    #[error("Interface '{0}' not present in /proc/net/dev")]
    InterfaceMissing(String),
}
