// Routing table reader and writer backed by `ip route`

use super::{IpCommand, Ipv4Prefix, Route, RouteTableSnapshot, RoutingTable};
use crate::error::{AppError, AppResult};
use std::process::Command;

impl RoutingTable for IpCommand {
    fn snapshot(&self) -> AppResult<RouteTableSnapshot> {
        get_routing_table()
    }

    fn insert(&mut self, route: &Route) -> AppResult<()> {
        add_route(route)
    }
}

pub fn get_routing_table() -> AppResult<RouteTableSnapshot> {
    #[cfg(target_os = "linux")]
    return get_routing_table_linux();

    #[cfg(not(target_os = "linux"))]
    return Err(AppError::RoutingTableParse("Unsupported platform".to_string()));
}

#[cfg(target_os = "linux")]
fn get_routing_table_linux() -> AppResult<RouteTableSnapshot> {
    // Try using `ip -json -4 route show` first
    let output = Command::new("ip")
        .args(["-json", "-4", "route", "show"])
        .output()
        .map_err(|e| AppError::CommandExecution(format!("ip: {}", e)))?;

    let json = output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned());

    let routes = decode_routes(json.as_deref(), || {
        // Fallback to parsing `ip -4 route show` (non-JSON)
        let output = Command::new("ip")
            .args(["-4", "route", "show"])
            .output()
            .map_err(|e| AppError::CommandExecution(format!("ip: {}", e)))?;

        if !output.status.success() {
            return Err(AppError::RoutingTableParse(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    })?;

    Ok(RouteTableSnapshot {
        hostname: get_hostname(),
        routes,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Decode the JSON listing when there is one, otherwise the text listing from `text_output`
pub fn decode_routes<F>(json: Option<&str>, text_output: F) -> AppResult<Vec<Route>>
where
    F: FnOnce() -> AppResult<String>,
{
    if let Some(json) = json {
        match parse_ip_json(json) {
            Ok(routes) => return Ok(routes),
            Err(e) => tracing::debug!("ip -json route output not usable: {}", e),
        }
    }

    Ok(parse_ip_route(&text_output()?))
}

/// Parse JSON output from `ip -json -4 route show`
pub fn parse_ip_json(json_str: &str) -> AppResult<Vec<Route>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json_str)?;

    let mut routes = Vec::new();

    for entry in entries {
        let dst = entry.get("dst").and_then(|v| v.as_str()).unwrap_or("default");

        let destination = match dst.parse::<Ipv4Prefix>() {
            Ok(prefix) => prefix,
            Err(e) => {
                tracing::debug!("Skipping route entry: {}", e);
                continue;
            }
        };

        let gateway = entry
            .get("gateway")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());

        let interface = entry
            .get("dev")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let metric = entry.get("metric").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

        routes.push(Route {
            destination,
            interface,
            gateway,
            metric,
        });
    }

    Ok(routes)
}

/// Parse non-JSON output from `ip -4 route show`
pub fn parse_ip_route(output: &str) -> Vec<Route> {
    let mut routes = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Typed routes lead with their type, e.g. "blackhole 10.9.0.0/16"
        let dst = match parts.first().copied() {
            Some("unicast" | "blackhole" | "unreachable" | "prohibit" | "local" | "broadcast") => {
                parts.get(1).copied()
            }
            other => other,
        };
        let Some(dst) = dst else {
            continue;
        };

        let destination = match dst.parse::<Ipv4Prefix>() {
            Ok(prefix) => prefix,
            Err(e) => {
                tracing::debug!("Skipping route line '{}': {}", line, e);
                continue;
            }
        };

        let mut gateway = None;
        let mut interface = String::new();
        let mut metric = 0;

        let mut i = 1;
        while i < parts.len() {
            match (parts[i], parts.get(i + 1)) {
                ("via", Some(gw)) => {
                    gateway = gw.parse().ok();
                    i += 2;
                }
                ("dev", Some(iface)) => {
                    interface = iface.to_string();
                    i += 2;
                }
                ("metric", Some(m)) => {
                    metric = m.parse().unwrap_or(0);
                    i += 2;
                }
                _ => {
                    i += 1;
                }
            }
        }

        routes.push(Route {
            destination,
            interface,
            gateway,
            metric,
        });
    }

    routes
}

/// Insert one route with `ip route add`
fn add_route(route: &Route) -> AppResult<()> {
    let destination = route.destination.to_string();
    let mut args = vec!["route".to_string(), "add".to_string(), destination.clone()];
    if let Some(gw) = route.gateway {
        args.push("via".to_string());
        args.push(gw.to_string());
    }
    args.push("dev".to_string());
    args.push(route.interface.clone());

    tracing::debug!("Running: ip {}", args.join(" "));

    let output = Command::new("ip")
        .args(&args)
        .output()
        .map_err(|e| AppError::RouteInsert {
            destination: destination.clone(),
            reason: format!("failed to execute ip: {}", e),
        })?;

    if !output.status.success() {
        return Err(AppError::RouteInsert {
            destination,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
