//! Immutable catalog of controllable applications.
//!
//! Built once at startup from the `[[apps]]` config entries and injected
//! into the controller; nothing mutates it afterwards.

use std::collections::HashMap;

use crate::config::AppEntry;

/// Name-to-entry table for the configured applications.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    entries: HashMap<String, AppEntry>,
}

impl AppCatalog {
    /// Build a catalog from config entries.
    ///
    /// Duplicate names are rejected during config validation, so a later
    /// entry silently replacing an earlier one here cannot happen in
    /// practice.
    #[must_use]
    pub fn from_entries(entries: Vec<AppEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();
        Self { entries }
    }

    /// Look up an application by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AppEntry> {
        self.entries.get(name)
    }

    /// All catalog names, sorted for stable output.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All entries, sorted by name.
    #[must_use]
    pub fn entries(&self) -> Vec<&AppEntry> {
        let mut entries: Vec<&AppEntry> = self.entries.values().collect();
        entries.sort_unstable_by_key(|e| e.name.as_str());
        entries
    }

    /// Number of configured applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Substitute action placeholders with the entry's values.
///
/// `{target}` and `{namespace}` always expand; `{port}` expands only when
/// a port is supplied (the configure action), otherwise the literal text
/// is left in place.
pub(crate) fn expand_args(
    args: &[String],
    target: &str,
    namespace: &str,
    port: Option<u16>,
) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut expanded = arg
                .replace("{target}", target)
                .replace("{namespace}", namespace);
            if let Some(port) = port {
                expanded = expanded.replace("{port}", &port.to_string());
            }
            expanded
        })
        .collect()
}
