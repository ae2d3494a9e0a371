// IPv4 addresses bound to an interface, read with `ip addr show`

use super::{InterfaceAddresses, IpCommand};
use crate::error::{AppError, AppResult};
use std::net::Ipv4Addr;
use std::process::Command;

impl InterfaceAddresses for IpCommand {
    fn ipv4_addresses(&self, interface: &str) -> AppResult<Vec<Ipv4Addr>> {
        get_interface_addresses(interface)
    }
}

/// Get the IPv4 addresses of an interface in the order the kernel reports them.
///
/// A missing interface is not an error here: it yields an empty list and the
/// caller decides what that means.
pub fn get_interface_addresses(interface: &str) -> AppResult<Vec<Ipv4Addr>> {
    let output = Command::new("ip")
        .args(["-json", "-4", "addr", "show", "dev", interface])
        .output()
        .map_err(|e| AppError::CommandExecution(format!("ip: {}", e)))?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Ok(addrs) = parse_addr_json(&stdout) {
            return Ok(addrs);
        }
    }

    // Fallback to `ip -4 addr show` for iproute2 builds without -json
    let output = Command::new("ip")
        .args(["-4", "addr", "show", "dev", interface])
        .output()
        .map_err(|e| AppError::CommandExecution(format!("ip: {}", e)))?;

    if !output.status.success() {
        tracing::debug!(
            "ip addr show {} failed: {}",
            interface,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(Vec::new());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_addr_show(&stdout))
}

/// Parse JSON output from `ip -json -4 addr show dev <name>`
pub fn parse_addr_json(json_str: &str) -> AppResult<Vec<Ipv4Addr>> {
    let links: Vec<serde_json::Value> = serde_json::from_str(json_str)?;

    let addrs: Vec<Ipv4Addr> = links
        .iter()
        .filter_map(|link| link.get("addr_info").and_then(|v| v.as_array()))
        .flatten()
        .filter(|info| info.get("family").and_then(|v| v.as_str()) == Some("inet"))
        .filter_map(|info| info.get("local").and_then(|v| v.as_str()))
        .filter_map(|local| local.parse().ok())
        .collect();

    Ok(addrs)
}

/// Parse `inet X.X.X.X/Y` lines, ignoring the netmask
pub fn parse_addr_show(output: &str) -> Vec<Ipv4Addr> {
    let mut addrs = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if !line.starts_with("inet ") {
            continue;
        }
        // Format: "inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0"
        let parts: Vec<&str> = line.split_whitespace().collect();
        if let Some(addr_cidr) = parts.get(1) {
            let addr_str = addr_cidr.split_once('/').map_or(*addr_cidr, |(addr, _)| addr);
            if let Ok(addr) = addr_str.parse::<Ipv4Addr>() {
                addrs.push(addr);
            }
        }
    }

    addrs
}
