//! Configuration loading with hierarchy merging.
//!
//! Configuration is loaded from multiple sources and merged in order:
//!
//! 1. Embedded defaults (compiled into binary)
//! 2. System config: `/etc/portkeep/config.toml`
//! 3. User config: `~/.config/portkeep/config.toml`
//! 4. Additional config file (via `--config` flag)
//! 5. CLI flags (highest priority)
//!
//! Scalars are **overridden** by later layers; app entries are **replaced
//! by name** and otherwise appended.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::error::ConfigError;
use super::schema::{Config, GeneralConfig, DEFAULT_CONFIG};
use crate::cli::Cli;

/// System-wide configuration path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/portkeep/config.toml";

/// User configuration directory name.
pub const USER_CONFIG_DIR: &str = "portkeep";

/// User configuration filename.
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Configuration loader with support for hierarchy merging.
pub struct ConfigLoader {
    /// Path to system-wide configuration.
    system_path: PathBuf,
    /// Path to user configuration.
    user_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new ConfigLoader with default paths.
    #[must_use]
    pub fn new() -> Self {
        let user_config_dir = dirs::config_dir()
            .map(|p| p.join(USER_CONFIG_DIR))
            .unwrap_or_else(|| PathBuf::from(".config").join(USER_CONFIG_DIR));

        Self {
            system_path: PathBuf::from(SYSTEM_CONFIG_PATH),
            user_path: user_config_dir.join(USER_CONFIG_FILE),
        }
    }

    /// Create a ConfigLoader with custom paths (for testing).
    #[must_use]
    pub fn with_paths(system_path: PathBuf, user_path: PathBuf) -> Self {
        Self {
            system_path,
            user_path,
        }
    }

    /// Load and merge configuration from all sources.
    ///
    /// Missing system/user config files are not errors - they are simply
    /// skipped. A missing `--config` file is an error, as is invalid TOML
    /// anywhere. The merged result is validated before being returned.
    pub fn load(&self, cli: &Cli) -> Result<Config, ConfigError> {
        // Start with embedded defaults
        let mut config: Config =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| ConfigError::ParseError {
                path: PathBuf::from("<embedded>"),
                source: e,
            })?;
        debug!("Loaded embedded default configuration");

        // Load and merge system config
        if let Some(system_config) = self.load_file(&self.system_path)? {
            config.merge(system_config);
            debug!("Loaded system config from {:?}", self.system_path);
        } else {
            debug!("No system config found at {:?}", self.system_path);
        }

        // Load and merge user config
        if let Some(user_config) = self.load_file(&self.user_path)? {
            config.merge(user_config);
            debug!("Loaded user config from {:?}", self.user_path);
        } else {
            debug!("No user config found at {:?}", self.user_path);
        }

        // Load and merge additional config file from CLI
        if let Some(ref cli_config_path) = cli.config {
            match self.load_file(cli_config_path)? {
                Some(cli_config) => {
                    config.merge(cli_config);
                    debug!("Loaded additional config from {:?}", cli_config_path);
                }
                None => {
                    // Unlike system/user config, a missing CLI-specified config is an error
                    return Err(ConfigError::ReadError {
                        path: cli_config_path.clone(),
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "Specified config file not found",
                        ),
                    });
                }
            }
        }

        // Apply CLI flags (highest priority)
        let cli_overrides = Config {
            general: GeneralConfig {
                refresh_seconds: cli.refresh_seconds.unwrap_or(0),
                gateway: cli.gateway.clone().unwrap_or_default(),
                probe_timeout_seconds: cli.probe_timeout.unwrap_or(0),
                status_refresh_seconds: cli.status_refresh.unwrap_or(0),
                natpmp_tool: String::new(),
            },
            apps: Vec::new(),
        };
        config.merge(cli_overrides);

        config.validate()?;
        Ok(config)
    }

    /// Load a config file, returning None if it doesn't exist.
    fn load_file(&self, path: &PathBuf) -> Result<Option<Config>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config =
                    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                        path: path.clone(),
                        source: e,
                    })?;
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::ReadError {
                path: path.clone(),
                source: e,
            }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_cli() -> Cli {
        Cli {
            refresh_seconds: None,
            gateway: None,
            probe_timeout: None,
            control: vec![],
            config: None,
            verbose: 0,
            status: false,
            status_refresh: None,
            status_timeout: None,
            app_list: false,
            vpn_status: false,
            diagnostics: false,
            network_info: false,
        }
    }

    fn loader_in(dir: &std::path::Path) -> ConfigLoader {
        ConfigLoader::with_paths(dir.join("system.toml"), dir.join("user.toml"))
    }

    #[test]
    fn test_embedded_defaults_are_valid() {
        let dir = tempdir().unwrap();
        let loader = loader_in(dir.path());
        let cli = create_test_cli();

        let config = loader.load(&cli).unwrap();

        assert_eq!(config.general.refresh_seconds, 45);
        assert_eq!(config.general.gateway, "10.2.0.1");
        assert!(config.apps.iter().any(|a| a.name == "Folx3-setapp"));
    }

    #[test]
    fn test_user_config_overrides_system() {
        let dir = tempdir().unwrap();

        let system_config = r#"
            [general]
            refresh_seconds = 60
        "#;
        fs::write(dir.path().join("system.toml"), system_config).unwrap();

        let user_config = r#"
            [general]
            refresh_seconds = 90
        "#;
        fs::write(dir.path().join("user.toml"), user_config).unwrap();

        let loader = loader_in(dir.path());
        let config = loader.load(&create_test_cli()).unwrap();

        assert_eq!(config.general.refresh_seconds, 90);
    }

    #[test]
    fn test_user_config_replaces_app_by_name() {
        let dir = tempdir().unwrap();

        let user_config = r#"
            [[apps]]
            name = "Folx3-setapp"
            launch_target = "/custom/Folx.app"
            config_namespace = "com.eltima.Folx3-setapp"
            start = { program = "open", args = ["-a", "{target}"] }
            stop = { program = "pkill", args = ["-f", "Folx"] }
            configure = { program = "defaults", args = ["write", "{namespace}", "TorrentTCPPort", "{port}"] }
        "#;
        fs::write(dir.path().join("user.toml"), user_config).unwrap();

        let loader = loader_in(dir.path());
        let config = loader.load(&create_test_cli()).unwrap();

        let folx: Vec<_> = config
            .apps
            .iter()
            .filter(|a| a.name == "Folx3-setapp")
            .collect();
        assert_eq!(folx.len(), 1);
        assert_eq!(folx[0].launch_target, "/custom/Folx.app");
    }

    #[test]
    fn test_cli_flags_override_files() {
        let dir = tempdir().unwrap();

        let user_config = r#"
            [general]
            refresh_seconds = 90
            gateway = "10.9.0.1"
        "#;
        fs::write(dir.path().join("user.toml"), user_config).unwrap();

        let loader = loader_in(dir.path());
        let mut cli = create_test_cli();
        cli.refresh_seconds = Some(120);
        cli.gateway = Some("192.168.50.1".to_string());

        let config = loader.load(&cli).unwrap();

        assert_eq!(config.general.refresh_seconds, 120);
        assert_eq!(config.general.gateway, "192.168.50.1");
    }

    #[test]
    fn test_missing_cli_config_is_error() {
        let dir = tempdir().unwrap();
        let loader = loader_in(dir.path());

        let mut cli = create_test_cli();
        cli.config = Some(dir.path().join("nope.toml"));

        let err = loader.load(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempdir().unwrap();

        let invalid_toml = "this is not valid TOML [[[";
        fs::write(dir.path().join("system.toml"), invalid_toml).unwrap();

        let loader = loader_in(dir.path());
        let result = loader.load(&create_test_cli());

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_invalid_app_entry_fails_validation() {
        let dir = tempdir().unwrap();

        let user_config = r#"
            [[apps]]
            name = "hollow"
            start = { program = "" }
            stop = { program = "true" }
            configure = { program = "true" }
        "#;
        fs::write(dir.path().join("user.toml"), user_config).unwrap();

        let loader = loader_in(dir.path());
        let err = loader.load(&create_test_cli()).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
