//! Configuration schema definitions.
//!
//! This module defines the structure of the portkeep configuration files.
//! Configuration is loaded from multiple sources and merged in order:
//!
//! 1. Embedded defaults (compiled into the binary)
//! 2. System config: `/etc/portkeep/config.toml`
//! 3. User config: `~/.config/portkeep/config.toml`
//! 4. Additional config file (via `--config` flag)
//! 5. CLI flags (highest priority)

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Default configuration shipped inside the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Catalog of applications that can be restarted on a port change.
    ///
    /// Entries are selected at runtime with `--control <name>`; an entry
    /// that is never named is loaded but ignored.
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

impl Config {
    /// Merge another config into this one.
    ///
    /// Scalars are overridden when the other value is non-default.
    /// App entries are matched by name: a later entry with the same name
    /// replaces the earlier one wholesale, new names are appended.
    pub fn merge(&mut self, other: Config) {
        self.general.merge(other.general);

        for other_app in other.apps {
            if let Some(existing) = self.apps.iter_mut().find(|a| a.name == other_app.name) {
                *existing = other_app;
            } else {
                self.apps.push(other_app);
            }
        }
    }

    /// Check the merged configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.refresh_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.refresh_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.general.probe_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.probe_timeout_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.general.status_refresh_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.status_refresh_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.general.gateway.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.gateway".to_string(),
                message: "gateway address must not be empty".to_string(),
            });
        }
        if self.general.natpmp_tool.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.natpmp_tool".to_string(),
                message: "NAT-PMP helper command must not be empty".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for app in &self.apps {
            if !seen.insert(app.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("apps.{}", app.name),
                    message: "duplicate app name".to_string(),
                });
            }
            for (label, action) in [
                ("start", &app.start),
                ("stop", &app.stop),
                ("configure", &app.configure),
            ] {
                if action.program.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("apps.{}.{}", app.name, label),
                        message: "action program must not be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Names of all configured applications, in file order.
    pub fn app_names(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.name.as_str()).collect()
    }
}

/// General application settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GeneralConfig {
    /// Seconds between steady-state mapping refreshes.
    #[serde(default)]
    pub refresh_seconds: u64,

    /// NAT-PMP gateway address to query.
    #[serde(default)]
    pub gateway: String,

    /// Seconds to wait for a single NAT-PMP query.
    #[serde(default)]
    pub probe_timeout_seconds: u64,

    /// Seconds between status display redraws.
    #[serde(default)]
    pub status_refresh_seconds: u64,

    /// NAT-PMP helper command; bare names are resolved via PATH.
    #[serde(default)]
    pub natpmp_tool: String,
}

impl GeneralConfig {
    fn merge(&mut self, other: GeneralConfig) {
        // Scalars are overridden if non-default
        if other.refresh_seconds != 0 {
            self.refresh_seconds = other.refresh_seconds;
        }
        if !other.gateway.is_empty() {
            self.gateway = other.gateway;
        }
        if other.probe_timeout_seconds != 0 {
            self.probe_timeout_seconds = other.probe_timeout_seconds;
        }
        if other.status_refresh_seconds != 0 {
            self.status_refresh_seconds = other.status_refresh_seconds;
        }
        if !other.natpmp_tool.is_empty() {
            self.natpmp_tool = other.natpmp_tool;
        }
    }
}

/// One controllable application.
///
/// Action argument lists may contain the placeholders `{port}`, `{target}`
/// and `{namespace}`, substituted at invocation time with the current
/// mapped port, `launch_target` and `config_namespace` respectively.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppEntry {
    /// Name used to select this entry (`--control <name>`).
    pub name: String,

    /// Install path or bundle the start action launches.
    #[serde(default)]
    pub launch_target: String,

    /// Settings namespace the configure action writes into.
    #[serde(default)]
    pub config_namespace: String,

    /// Pattern for the running check (`pgrep -f`). Defaults to the name.
    #[serde(default)]
    pub process_match: Option<String>,

    /// Command that starts the application.
    pub start: AppAction,

    /// Command that stops the application.
    pub stop: AppAction,

    /// Command that writes the mapped port into the application's settings.
    pub configure: AppAction,
}

impl AppEntry {
    /// Pattern used to detect a running instance.
    #[must_use]
    pub fn process_pattern(&self) -> &str {
        self.process_match.as_deref().unwrap_or(&self.name)
    }
}

/// A single external command template.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppAction {
    /// Program to invoke.
    pub program: String,

    /// Arguments, possibly containing placeholders.
    #[serde(default)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_app(name: &str) -> AppEntry {
        AppEntry {
            name: name.to_string(),
            launch_target: String::new(),
            config_namespace: String::new(),
            process_match: None,
            start: AppAction {
                program: "true".to_string(),
                args: vec![],
            },
            stop: AppAction {
                program: "true".to_string(),
                args: vec![],
            },
            configure: AppAction {
                program: "true".to_string(),
                args: vec![],
            },
        }
    }

    #[test]
    fn test_default_config_is_empty() {
        let config = Config::default();

        assert_eq!(config.general.refresh_seconds, 0);
        assert_eq!(config.general.gateway, "");
        assert!(config.apps.is_empty());
    }

    #[test]
    fn test_config_merge_scalars() {
        let mut base = Config::default();
        let override_config = Config {
            general: GeneralConfig {
                refresh_seconds: 60,
                gateway: "192.168.1.1".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        base.merge(override_config);

        assert_eq!(base.general.refresh_seconds, 60);
        assert_eq!(base.general.gateway, "192.168.1.1");
    }

    #[test]
    fn test_config_merge_zero_does_not_override() {
        let mut base = Config {
            general: GeneralConfig {
                refresh_seconds: 45,
                gateway: "10.2.0.1".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        base.merge(Config::default());

        assert_eq!(base.general.refresh_seconds, 45);
        assert_eq!(base.general.gateway, "10.2.0.1");
    }

    #[test]
    fn test_config_merge_apps_by_name() {
        let mut base = Config {
            apps: vec![minimal_app("folx")],
            ..Default::default()
        };

        let mut replacement = minimal_app("folx");
        replacement.launch_target = "/opt/folx".to_string();
        let override_config = Config {
            apps: vec![replacement, minimal_app("transmission")],
            ..Default::default()
        };

        base.merge(override_config);

        // Same name replaced wholesale, new name appended
        assert_eq!(base.apps.len(), 2);
        assert_eq!(base.apps[0].name, "folx");
        assert_eq!(base.apps[0].launch_target, "/opt/folx");
        assert_eq!(base.apps[1].name, "transmission");
    }

    #[test]
    fn test_app_entry_deserialize() {
        let toml_str = r#"
            [general]
            refresh_seconds = 45

            [[apps]]
            name = "demo"
            launch_target = "/opt/demo"
            config_namespace = "org.example.demo"
            start = { program = "open", args = ["-a", "{target}"] }
            stop = { program = "pkill", args = ["-f", "demo"] }
            configure = { program = "demo-set", args = ["port", "{port}"] }
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.apps.len(), 1);
        let app = &config.apps[0];
        assert_eq!(app.name, "demo");
        assert_eq!(app.start.program, "open");
        assert_eq!(app.start.args, vec!["-a".to_string(), "{target}".to_string()]);
        assert_eq!(app.configure.args[1], "{port}");
        // No process_match given, falls back to the name
        assert_eq!(app.process_pattern(), "demo");
    }

    #[test]
    fn test_process_pattern_override() {
        let mut app = minimal_app("Folx3-setapp");
        app.process_match = Some("Folx".to_string());
        assert_eq!(app.process_pattern(), "Folx");
    }

    #[test]
    fn test_validate_rejects_zero_refresh() {
        let config = Config {
            general: GeneralConfig {
                refresh_seconds: 0,
                gateway: "10.2.0.1".to_string(),
                probe_timeout_seconds: 30,
                status_refresh_seconds: 5,
                natpmp_tool: "natpmp-client.py".to_string(),
            },
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_duplicate_app_names() {
        let config = Config {
            general: GeneralConfig {
                refresh_seconds: 45,
                gateway: "10.2.0.1".to_string(),
                probe_timeout_seconds: 30,
                status_refresh_seconds: 5,
                natpmp_tool: "natpmp-client.py".to_string(),
            },
            apps: vec![minimal_app("twice"), minimal_app("twice")],
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_action_program() {
        let mut app = minimal_app("broken");
        app.stop.program = String::new();
        let config = Config {
            general: GeneralConfig {
                refresh_seconds: 45,
                gateway: "10.2.0.1".to_string(),
                probe_timeout_seconds: 30,
                status_refresh_seconds: 5,
                natpmp_tool: "natpmp-client.py".to_string(),
            },
            apps: vec![app],
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_default_toml_parses() {
        // Verify that our shipped default config parses correctly
        let config: Config =
            toml::from_str(DEFAULT_CONFIG).expect("default.toml should parse as Config");

        assert_eq!(config.general.refresh_seconds, 45);
        assert_eq!(config.general.gateway, "10.2.0.1");
        assert_eq!(config.general.probe_timeout_seconds, 30);
        assert_eq!(config.general.status_refresh_seconds, 5);
        assert_eq!(config.general.natpmp_tool, "natpmp-client.py");

        // The shipped catalog carries the Folx entry
        let folx = config
            .apps
            .iter()
            .find(|a| a.name == "Folx3-setapp")
            .expect("default catalog should include Folx3-setapp");
        assert_eq!(folx.config_namespace, "com.eltima.Folx3-setapp");
        assert_eq!(folx.process_pattern(), "Folx");
        assert!(folx.configure.args.contains(&"{port}".to_string()));

        config.validate().expect("default config should validate");
    }

    #[test]
    fn test_app_names() {
        let config = Config {
            apps: vec![minimal_app("a"), minimal_app("b")],
            ..Default::default()
        };
        assert_eq!(config.app_names(), vec!["a", "b"]);
    }
}
