//! Command-line interface definitions for portkeep.
//!
//! Uses clap's derive API for type-safe argument parsing. The one-shot
//! mode flags are mutually exclusive; `--status` runs the refresh loop
//! with the live display on top.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Keep a NAT-PMP port mapping alive over a VPN.
///
/// portkeep queries the VPN gateway for a public port mapping, refreshes
/// it on a timer, and restarts dependent applications when the mapped
/// port changes. Without a mode flag it runs the refresh loop until
/// interrupted.
#[derive(Parser, Debug)]
#[command(name = "portkeep")]
#[command(author, version, about, long_about = None)]
#[command(group = ArgGroup::new("mode").args([
    "status",
    "app_list",
    "vpn_status",
    "diagnostics",
    "network_info",
]))]
pub struct Cli {
    /// Seconds between steady-state mapping refreshes.
    #[arg(long = "refresh-seconds", value_name = "SECS")]
    pub refresh_seconds: Option<u64>,

    /// NAT-PMP gateway address to query.
    #[arg(short = 'g', long = "gateway", value_name = "ADDR")]
    pub gateway: Option<String>,

    /// Seconds to wait for a single NAT-PMP query.
    #[arg(long = "probe-timeout", value_name = "SECS")]
    pub probe_timeout: Option<u64>,

    /// Application to restart on port changes (repeatable).
    ///
    /// Names refer to `[[apps]]` catalog entries in the configuration.
    /// Unknown names are warned about and skipped at runtime.
    #[arg(short = 'a', long = "control", value_name = "NAME")]
    pub control: Vec<String>,

    /// Path to additional config file.
    ///
    /// Merged on top of the system and user configs, giving it the
    /// highest priority except for CLI flags.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity.
    ///
    /// Can be specified multiple times:
    /// -v    = info level
    /// -vv   = debug level
    /// -vvv  = trace level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run the refresh loop with the live status display.
    #[arg(long = "status")]
    pub status: bool,

    /// Seconds between status display redraws.
    #[arg(long = "status-refresh", value_name = "SECS", requires = "status")]
    pub status_refresh: Option<u64>,

    /// End the status session after this many seconds.
    #[arg(long = "status-timeout", value_name = "SECS", requires = "status")]
    pub status_timeout: Option<u64>,

    /// One-shot: list the configured applications and exit.
    #[arg(long = "app-list")]
    pub app_list: bool,

    /// One-shot: check the VPN route and run a single probe.
    #[arg(long = "vpn-status")]
    pub vpn_status: bool,

    /// One-shot: run connectivity and NAT-PMP diagnostics.
    #[arg(long = "diagnostics")]
    pub diagnostics: bool,

    /// One-shot: dump routes, interfaces and DNS resolution.
    #[arg(long = "network-info")]
    pub network_info: bool,
}

/// Which top-level mode the flags selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Long-running refresh loop, logging only.
    Refresh,
    /// Refresh loop with the live status display.
    Status,
    /// Print the application catalog and exit.
    AppList,
    /// Report the VPN route and one probe result.
    VpnStatus,
    /// Connectivity and NAT-PMP diagnostics.
    Diagnostics,
    /// Route table, interface list and DNS resolution.
    NetworkInfo,
}

impl Cli {
    /// Resolve the mode flags into a single mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.app_list {
            Mode::AppList
        } else if self.vpn_status {
            Mode::VpnStatus
        } else if self.diagnostics {
            Mode::Diagnostics
        } else if self.network_info {
            Mode::NetworkInfo
        } else if self.status {
            Mode::Status
        } else {
            Mode::Refresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["portkeep"]);

        assert_eq!(cli.refresh_seconds, None);
        assert_eq!(cli.gateway, None);
        assert!(cli.control.is_empty());
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.mode(), Mode::Refresh);
    }

    #[test]
    fn test_cli_parse_refresh_options() {
        let cli = Cli::parse_from([
            "portkeep",
            "--refresh-seconds",
            "60",
            "-g",
            "10.2.0.1",
            "--probe-timeout",
            "10",
            "-a",
            "Folx3-setapp",
            "-a",
            "transmission",
            "-vv",
        ]);

        assert_eq!(cli.refresh_seconds, Some(60));
        assert_eq!(cli.gateway, Some("10.2.0.1".to_string()));
        assert_eq!(cli.probe_timeout, Some(10));
        assert_eq!(cli.control, vec!["Folx3-setapp", "transmission"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.mode(), Mode::Refresh);
    }

    #[test]
    fn test_cli_parse_status_mode() {
        let cli = Cli::parse_from([
            "portkeep",
            "--status",
            "--status-refresh",
            "2",
            "--status-timeout",
            "600",
        ]);

        assert_eq!(cli.mode(), Mode::Status);
        assert_eq!(cli.status_refresh, Some(2));
        assert_eq!(cli.status_timeout, Some(600));
    }

    #[test]
    fn test_cli_parse_one_shot_modes() {
        assert_eq!(
            Cli::parse_from(["portkeep", "--app-list"]).mode(),
            Mode::AppList
        );
        assert_eq!(
            Cli::parse_from(["portkeep", "--vpn-status"]).mode(),
            Mode::VpnStatus
        );
        assert_eq!(
            Cli::parse_from(["portkeep", "--diagnostics"]).mode(),
            Mode::Diagnostics
        );
        assert_eq!(
            Cli::parse_from(["portkeep", "--network-info"]).mode(),
            Mode::NetworkInfo
        );
    }

    #[test]
    fn test_cli_mode_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["portkeep", "--status", "--app-list"]).is_err());
        assert!(Cli::try_parse_from(["portkeep", "--diagnostics", "--network-info"]).is_err());
    }

    #[test]
    fn test_cli_status_options_require_status() {
        assert!(Cli::try_parse_from(["portkeep", "--status-refresh", "2"]).is_err());
        assert!(Cli::try_parse_from(["portkeep", "--status-timeout", "60"]).is_err());
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["portkeep", "-c", "/tmp/extra.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/extra.toml")));
    }
}
