//! Dependent application control.
//!
//! The catalog maps application names to start/stop/configure command
//! templates; the controller runs them in batches that tolerate unknown
//! names and individual failures. The lifecycle invokes these around port
//! changes: stop, settle, configure with the new port, start.

mod catalog;
mod controller;
mod error;

pub use catalog::AppCatalog;
pub use controller::{
    is_running, ActionRunner, AppController, SystemRunner, ACTION_TIMEOUT, RUNNING_CHECK_TIMEOUT,
};
pub use error::{ActionFailure, AppError};
