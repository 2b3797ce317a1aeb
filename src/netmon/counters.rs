//! Interface byte counters and VPN tunnel detection.
//!
//! Counters come straight from `/proc/net/dev`: per interface, receive
//! bytes/packets are the first two fields after the colon and transmit
//! bytes/packets are fields 8 and 9. The tunnel interface is found by
//! asking the route table which device reaches the gateway, with a
//! wireguard/tun name scan as fallback. Both are best-effort; failure
//! only disables the rate display.

use tracing::debug;

use super::diag::run_diagnostic;
use super::error::NetMonError;

/// Counter source for all interfaces.
pub const PROC_NET_DEV: &str = "/proc/net/dev";

/// Cumulative byte/packet counters for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceCounters {
    /// Total bytes received.
    pub rx_bytes: u64,
    /// Total packets received.
    pub rx_packets: u64,
    /// Total bytes transmitted.
    pub tx_bytes: u64,
    /// Total packets transmitted.
    pub tx_packets: u64,
}

/// Read the current counters for `interface` from `/proc/net/dev`.
pub fn read_interface_counters(interface: &str) -> Result<InterfaceCounters, NetMonError> {
    let content =
        std::fs::read_to_string(PROC_NET_DEV).map_err(|e| NetMonError::ReadError {
            path: PROC_NET_DEV.to_string(),
            source: e,
        })?;
    parse_interface_counters(&content, interface)
}

/// Device the route table uses to reach `gateway`, if any.
///
/// This is the authoritative reachability answer: a `None` means the
/// kernel has no route to the gateway, regardless of what tunnel
/// interfaces happen to exist.
pub async fn route_to_gateway(gateway: &str) -> Option<String> {
    let route = run_diagnostic("ip", &["route", "get", gateway]).await;
    if !route.succeeded {
        return None;
    }
    let device = parse_route_device(&route.stdout)?;
    debug!(interface = %device, gateway, "Route to gateway via device");
    Some(device)
}

/// Best-effort detection of the VPN tunnel interface.
///
/// Prefers the route table, then falls back to scanning the interface
/// list for a tunnel-looking name. The fallback can name a stale tunnel
/// with no route behind it, so this is only suitable for picking a
/// counter source; reachability questions go through
/// [`route_to_gateway`]. Returns `None` when neither source gives an
/// answer; callers degrade to no rate display.
pub async fn detect_vpn_interface(gateway: &str) -> Option<String> {
    if let Some(device) = route_to_gateway(gateway).await {
        return Some(device);
    }

    let content = std::fs::read_to_string(PROC_NET_DEV).ok()?;
    let device = fallback_tunnel_interface(&content)?;
    debug!(interface = %device, "VPN interface from tunnel name scan");
    Some(device)
}

/// Parse `/proc/net/dev` content for one interface's counters.
///
/// Format (after two header lines):
/// ```text
/// Inter-|   Receive                            |  Transmit
///  face |bytes packets errs drop fifo frame compressed multicast|bytes packets ...
///   wg0: 815090   3110    0    0    0     0          0         0  170001  1825 ...
/// ```
fn parse_interface_counters(
    content: &str,
    interface: &str,
) -> Result<InterfaceCounters, NetMonError> {
    for line in content.lines().skip(2) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != interface {
            continue;
        }

        let fields: Vec<&str> = rest.split_whitespace().collect();
        if fields.len() < 10 {
            return Err(NetMonError::ParseError(format!(
                "expected at least 10 counter fields for {interface}, got {}",
                fields.len()
            )));
        }

        let counter = |idx: usize| -> Result<u64, NetMonError> {
            fields[idx].parse().map_err(|_| {
                NetMonError::ParseError(format!(
                    "invalid counter '{}' for {interface}",
                    fields[idx]
                ))
            })
        };

        return Ok(InterfaceCounters {
            rx_bytes: counter(0)?,
            rx_packets: counter(1)?,
            tx_bytes: counter(8)?,
            tx_packets: counter(9)?,
        });
    }

    Err(NetMonError::InterfaceMissing(interface.to_string()))
}

/// Pull the device name out of `ip route get` output.
///
/// Example: `10.2.0.1 dev proton0 src 10.2.0.2 uid 1000` -> `proton0`.
fn parse_route_device(output: &str) -> Option<String> {
    let mut fields = output.split_whitespace();
    while let Some(token) = fields.next() {
        if token == "dev" {
            return fields.next().map(str::to_string);
        }
    }
    None
}

/// First interface in `/proc/net/dev` that looks like a VPN tunnel.
fn fallback_tunnel_interface(content: &str) -> Option<String> {
    for line in content.lines().skip(2) {
        if let Some((name, _)) = line.split_once(':') {
            let name = name.trim();
            if name.starts_with("wg")
                || name.starts_with("tun")
                || name.starts_with("utun")
                || name.starts_with("proton")
            {
                return Some(name.to_string());
            }
        }
    }
    None
}
