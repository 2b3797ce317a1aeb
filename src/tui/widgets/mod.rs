//! Widgets for the status display panels.
//!
//! - `SummaryWidget` - Lease, gateway and rate summary
//! - `HistoryWidget` - Recent mapped port values
//! - `ActivityWidget` - Activity journal tail

mod activity;
mod history;
mod summary;

pub use activity::ActivityWidget;
pub use history::HistoryWidget;
pub use summary::SummaryWidget;
