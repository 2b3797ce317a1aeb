//! Configuration system for portkeep.
//!
//! This module provides TOML configuration loading with hierarchy merging.
//! Controllable applications are defined in `[[apps]]` sections of the
//! config file.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded from multiple sources and merged in order:
//!
//! 1. Embedded defaults (compiled into the binary)
//! 2. System config: `/etc/portkeep/config.toml`
//! 3. User config: `~/.config/portkeep/config.toml`
//! 4. Additional config file (via `--config` flag)
//! 5. CLI flags (highest priority)
//!
//! # Merge Behavior
//!
//! - **Scalars** (refresh interval, gateway, timeouts) are **overridden**
//! - **App entries** are matched by `name`: a later entry with the same
//!   name replaces the earlier one wholesale, new names are appended
//!
//! # App Catalog
//!
//! ```toml
//! [[apps]]
//! name = "Folx3-setapp"
//! launch_target = "/Applications/Setapp/Folx.app"
//! config_namespace = "com.eltima.Folx3-setapp"
//! process_match = "Folx"
//! start = { program = "open", args = ["-a", "{target}"] }
//! stop = { program = "osascript", args = ["-e", "quit app \"Folx\""] }
//! configure = { program = "defaults", args = ["write", "{namespace}", "GeneralUserSettings", "-dict-add", "TorrentTCPPort", "{port}"] }
//! ```

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{ConfigLoader, SYSTEM_CONFIG_PATH, USER_CONFIG_DIR, USER_CONFIG_FILE};
pub use schema::{AppAction, AppEntry, Config, GeneralConfig, DEFAULT_CONFIG};
