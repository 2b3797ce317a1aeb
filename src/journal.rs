//! Bounded in-process activity log.
//!
//! The lifecycle loop records every transition here (acquired, changed,
//! retry, restart, shutdown) and the status display renders the tail.
//! The buffer is a fixed-capacity ring: when full, the oldest entry is
//! evicted. Writers and the reader share it behind a mutex that is held
//! only for the instant of a push or a copy.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Default number of entries kept before eviction.
pub const DEFAULT_CAPACITY: usize = 200;

/// Severity of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Normal lifecycle progress.
    Info,
    /// Something failed but the loop continues.
    Warn,
    /// Something failed hard enough to end the run.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One recorded event.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// How serious it was.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

/// Fixed-capacity activity ring buffer, newest entry first.
#[derive(Debug)]
pub struct ActivityJournal {
    entries: Mutex<VecDeque<JournalEntry>>,
    capacity: usize,
}

impl ActivityJournal {
    /// Create a journal holding up to `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record an event, evicting the oldest entry when full.
    pub fn record(&self, severity: Severity, message: impl Into<String>) {
        let entry = JournalEntry {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        };

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Record an informational event.
    pub fn info(&self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    /// Record a warning.
    pub fn warn(&self, message: impl Into<String>) {
        self.record(Severity::Warn, message);
    }

    /// Record an error.
    pub fn error(&self, message: impl Into<String>) {
        self.record(Severity::Error, message);
    }

    /// Copy of the newest `limit` entries, newest first.
    #[must_use]
    pub fn tail(&self, limit: usize) -> Vec<JournalEntry> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.iter().take(limit).cloned().collect()
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the journal is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityJournal {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let journal = ActivityJournal::new(10);
        journal.info("first");
        journal.warn("second");

        let tail = journal.tail(10);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].message, "second");
        assert_eq!(tail[0].severity, Severity::Warn);
        assert_eq!(tail[1].message, "first");
    }

    #[test]
    fn test_eviction_keeps_newest() {
        let journal = ActivityJournal::new(3);
        for i in 0..5 {
            journal.info(format!("entry {i}"));
        }

        assert_eq!(journal.len(), 3);
        let tail = journal.tail(10);
        assert_eq!(tail[0].message, "entry 4");
        assert_eq!(tail[2].message, "entry 2");
    }

    #[test]
    fn test_tail_limit() {
        let journal = ActivityJournal::new(10);
        for i in 0..6 {
            journal.info(format!("entry {i}"));
        }

        assert_eq!(journal.tail(4).len(), 4);
    }

    #[test]
    fn test_empty() {
        let journal = ActivityJournal::default();
        assert!(journal.is_empty());
        assert!(journal.tail(5).is_empty());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warn.to_string(), "WARN");
        assert_eq!(Severity::Error.to_string(), "ERROR");
    }
}
