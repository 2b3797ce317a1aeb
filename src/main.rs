//! portkeep: keep a NAT-PMP port mapping alive over a VPN.
//!
//! This is the main entry point for the portkeep binary. It handles CLI
//! argument parsing, configuration loading and tracing initialization,
//! then hands the selected mode to the dispatch layer.
//!
//! # I/O Architecture
//!
//! - **Refresh mode**: tracing output goes to stderr; the process runs
//!   until interrupted or until initial acquisition gives up.
//! - **Status mode**: the alternate screen owns the terminal, so the
//!   tracing layer writes to a sink and the activity journal rendered by
//!   the display is the visible record.
//! - **One-shot modes**: results go to stdout, diagnostics to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use portkeep::{cli::Cli, cli_handler, config::ConfigLoader};
use tracing::debug;

fn main() -> Result<()> {
    // Parse CLI arguments first (before any other initialization)
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.status)?;

    debug!("Parsed CLI arguments: {:?}", cli);

    // Load configuration with hierarchy merging
    let config = ConfigLoader::new()
        .load(&cli)
        .context("Failed to load configuration")?;

    debug!("Loaded configuration: {:?}", config);

    cli_handler::dispatch(cli, config)
}

/// Initialize the tracing subscriber.
///
/// In status mode the fmt layer writes to a sink so log lines cannot
/// corrupt the alternate screen.
///
/// # Verbosity Levels
/// - 0 (default): Only warnings and errors
/// - 1 (-v): Info level
/// - 2 (-vv): Debug level
/// - 3+ (-vvv): Trace level
fn init_tracing(verbose: u8, status_mode: bool) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if status_mode {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::sink))
            .with(filter)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;
    }

    Ok(())
}
