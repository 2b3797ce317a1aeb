//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading or validating the layered configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read config file {path}: {source}")]
    ReadError {
        /// The offending file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A config file is not valid TOML or does not match the schema.
    #[error("cannot parse config file {path}: {source}")]
    ParseError {
        /// The offending file.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },

    /// The merged configuration failed validation.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Dotted path of the rejected field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },
}
