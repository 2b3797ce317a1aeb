//! Mode dispatch for portkeep.
//!
//! Builds the tokio runtime and routes the parsed CLI to either the
//! long-running orchestrator or one of the one-shot informational modes.
//! One-shot modes print to stdout and exit 0 even when the network is
//! broken; only a missing NAT-PMP helper is an error.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::apps::{self, AppCatalog};
use crate::cli::{Cli, Mode};
use crate::config::Config;
use crate::netmon::{self, DiagnosticResult};
use crate::orchestrator;
use crate::probe::{NatPmpProbe, Prober};

/// Run the selected mode to completion.
pub fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(async {
        match cli.mode() {
            Mode::AppList => {
                run_app_list(&config).await;
                Ok(())
            }
            Mode::VpnStatus => run_vpn_status(&config).await,
            Mode::Diagnostics => run_diagnostics(&config).await,
            Mode::NetworkInfo => {
                run_network_info().await;
                Ok(())
            }
            Mode::Refresh | Mode::Status => orchestrator::run(&cli, &config).await,
        }
    })
}

/// Resolve the configured NAT-PMP helper into a usable probe.
///
/// A missing helper propagates as an error, which is the only way a
/// one-shot mode exits non-zero.
fn build_probe(config: &Config) -> Result<NatPmpProbe> {
    NatPmpProbe::new(
        &config.general.natpmp_tool,
        &config.general.gateway,
        Duration::from_secs(config.general.probe_timeout_seconds),
    )
    .context("NAT-PMP helper is required")
}

/// `--app-list`: print every catalog entry with a running check.
async fn run_app_list(config: &Config) {
    let catalog = AppCatalog::from_entries(config.apps.clone());
    if catalog.is_empty() {
        println!("No applications configured.");
        return;
    }

    println!("Configured applications:");
    for entry in catalog.entries() {
        let running = if apps::is_running(entry).await {
            "running"
        } else {
            "not running"
        };
        println!("  {} [{running}]", entry.name);
        println!("    target:    {}", entry.launch_target);
        println!("    namespace: {}", entry.config_namespace);
    }
}

/// `--vpn-status`: route check plus a single probe.
///
/// Reachability comes from the route table alone; the tunnel-name scan
/// used for rate display would report a stale tunnel as reachable.
async fn run_vpn_status(config: &Config) -> Result<()> {
    let gateway = &config.general.gateway;
    match netmon::route_to_gateway(gateway).await {
        Some(interface) => println!("VPN gateway {gateway} reachable via {interface}"),
        None => println!("No route to VPN gateway {gateway}"),
    }

    let probe = build_probe(config)?;
    match probe.acquire().await {
        Ok(port) => println!("NAT-PMP mapped public port: {port}"),
        Err(e) => println!("NAT-PMP query failed: {e}"),
    }
    Ok(())
}

/// `--diagnostics`: reachability probe and a single NAT-PMP probe.
async fn run_diagnostics(config: &Config) -> Result<()> {
    print_result(&netmon::connectivity_check().await);

    let probe = build_probe(config)?;
    match probe.acquire().await {
        Ok(port) => println!("[ok]   NAT-PMP probe via {}: port {port}", config.general.gateway),
        Err(e) => println!("[fail] NAT-PMP probe via {}: {e}", config.general.gateway),
    }
    Ok(())
}

/// `--network-info`: route table, interface list, DNS resolution.
async fn run_network_info() {
    for result in netmon::network_info().await {
        print_result(&result);
    }
}

fn print_result(result: &DiagnosticResult) {
    let marker = if result.succeeded { "ok" } else { "fail" };
    println!("[{marker}] {}", result.command);
    for line in result.stdout.lines() {
        println!("    {line}");
    }
    for line in result.stderr.lines() {
        println!("    ! {line}");
    }
    println!();
}
