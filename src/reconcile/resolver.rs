// Local membership resolver - longest prefix match of the host address against the registry

use super::registry::{SubnetEntry, SubnetRegistry};
use crate::error::{AppError, AppResult};
use std::net::Ipv4Addr;

/// Which interface addresses are consulted when looking for the local subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressPolicy {
    /// Only the first address the OS reports; secondary addresses are ignored
    #[default]
    FirstOnly,
    /// Each address in OS order until one falls inside a declared subnet
    FirstMatching,
}

/// The declared subnet this host belongs to, and the address that put it there
#[derive(Debug, Clone, Copy)]
pub struct Membership<'a> {
    pub address: Ipv4Addr,
    pub subnet: &'a SubnetEntry,
}

/// Find the most specific declared subnet containing `addr`.
///
/// Among equally long matches the one declared last wins.
pub fn longest_match(registry: &SubnetRegistry, addr: Ipv4Addr) -> Option<&SubnetEntry> {
    let mut best_match: Option<&SubnetEntry> = None;

    for entry in registry.entries() {
        if !entry.prefix.contains(addr) {
            continue;
        }
        match best_match {
            Some(current) if entry.prefix.prefix_len() < current.prefix.prefix_len() => {}
            _ => best_match = Some(entry),
        }
    }

    best_match
}

/// Resolve which declared subnet the interface's addresses belong to.
///
/// Returns `Ok(None)` when no consulted address is inside any declared subnet.
pub fn resolve<'a>(
    registry: &'a SubnetRegistry,
    interface: &str,
    addresses: &[Ipv4Addr],
    policy: AddressPolicy,
) -> AppResult<Option<Membership<'a>>> {
    if addresses.is_empty() {
        return Err(AppError::Interface(format!(
            "interface {} does not exist or has no IPv4 addresses assigned",
            interface
        )));
    }

    let candidates = match policy {
        AddressPolicy::FirstOnly => &addresses[..1],
        AddressPolicy::FirstMatching => addresses,
    };

    for &address in candidates {
        tracing::info!("assuming IP is: {}", address);
        if let Some(subnet) = longest_match(registry, address) {
            return Ok(Some(Membership { address, subnet }));
        }
    }

    Ok(None)
}
