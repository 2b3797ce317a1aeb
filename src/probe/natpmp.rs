//! NAT-PMP mapping queries via the external helper tool.
//!
//! The helper is invoked as `<tool> -g <gateway> 0 0` (protocol zero,
//! host and peer wildcards), which asks the gateway to map a public port
//! both ways. Its stdout is a single whitespace-separated result line;
//! the mapped public port is the integer before the comma in field 14.
//! That offset is a compatibility contract with the helper's current
//! output format, kept in [`PORT_FIELD_INDEX`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ProbeError;

/// Whitespace-split field of the helper's output holding `<port>,<...>`.
pub const PORT_FIELD_INDEX: usize = 14;

/// Anything that can ask the gateway for the current public port.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Query the gateway once, returning the mapped public port.
    async fn acquire(&self) -> Result<u16, ProbeError>;
}

/// Probe backed by the external NAT-PMP helper command.
#[derive(Debug)]
pub struct NatPmpProbe {
    tool: PathBuf,
    gateway: String,
    timeout: Duration,
}

impl NatPmpProbe {
    /// Resolve the helper command and build a probe.
    ///
    /// Resolution happens here so a missing helper fails at startup, not
    /// on the first refresh tick.
    pub fn new(tool: &str, gateway: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let tool = resolve_tool(tool)?;
        debug!(tool = %tool.display(), gateway, "Resolved NAT-PMP helper");
        Ok(Self {
            tool,
            gateway: gateway.to_string(),
            timeout,
        })
    }

    /// Resolved path of the helper binary.
    #[must_use]
    pub fn tool_path(&self) -> &Path {
        &self.tool
    }

    /// Gateway this probe queries.
    #[must_use]
    pub fn gateway(&self) -> &str {
        &self.gateway
    }
}

#[async_trait]
impl Prober for NatPmpProbe {
    async fn acquire(&self) -> Result<u16, ProbeError> {
        let mut command = Command::new(&self.tool);
        command
            .arg("-g")
            .arg(&self.gateway)
            .arg("0")
            .arg("0")
            .kill_on_drop(true);

        let output = tokio::select! {
            result = command.output() => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::ToolMissing(self.tool.display().to_string())
                } else {
                    ProbeError::Spawn(e)
                }
            })?,
            () = tokio::time::sleep(self.timeout) => {
                warn!(timeout_secs = self.timeout.as_secs(), "NAT-PMP query timed out");
                return Err(ProbeError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            return Err(ProbeError::ToolError {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_mapped_port(&stdout)
    }
}

/// Locate the helper binary.
///
/// Absolute paths are used as given, relative paths containing a separator
/// are canonicalized, bare names go through a PATH lookup.
fn resolve_tool(command: &str) -> Result<PathBuf, ProbeError> {
    let path = PathBuf::from(command);
    if path.is_absolute() {
        if path.exists() {
            Ok(path)
        } else {
            Err(ProbeError::ToolMissing(command.to_string()))
        }
    } else if command.contains('/') {
        std::fs::canonicalize(&path).map_err(|_| ProbeError::ToolMissing(command.to_string()))
    } else {
        which::which(command).map_err(|_| ProbeError::ToolMissing(command.to_string()))
    }
}

/// Extract the mapped public port from the helper's stdout.
fn parse_mapped_port(output: &str) -> Result<u16, ProbeError> {
    let fields: Vec<&str> = output.split_whitespace().collect();
    let token = fields.get(PORT_FIELD_INDEX).ok_or_else(|| {
        ProbeError::ParseError(format!(
            "expected at least {} fields, got {}",
            PORT_FIELD_INDEX + 1,
            fields.len()
        ))
    })?;

    let port_str = match token.split_once(',') {
        Some((head, _)) => head,
        None => token,
    };

    port_str.parse::<u16>().map_err(|_| {
        ProbeError::ParseError(format!(
            "field {PORT_FIELD_INDEX} is not a port number: '{token}'"
        ))
    })
}
