//! Live status display.
//!
//! A ratatui view over the lifecycle's published snapshots and the
//! activity journal. The display polls and renders on its own cadence,
//! strictly read-only with respect to lifecycle state; its only write
//! path is the manual-refresh poke back to the lifecycle loop.
//!
//! # Layout
//!
//! ```text
//! ┌───────────────────┬──────────────┐
//! │  Lease summary    │ Port history │
//! ├───────────────────┴──────────────┤
//! │             Activity             │
//! ├──────────────────────────────────┤
//! │ [r] refresh now  [q] quit        │
//! └──────────────────────────────────┘
//! ```

mod app;
mod input;
mod layout;
mod runner;
mod widgets;

pub use app::TuiApp;
pub use input::{handle_event, InputResult};
pub use layout::{StatusLayout, MIN_HEIGHT, MIN_WIDTH};
pub use runner::{TuiRunner, INPUT_POLL};
pub use widgets::{ActivityWidget, HistoryWidget, SummaryWidget};
