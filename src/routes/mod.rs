// Routes module - route types and the system collaborators that read and change them

#[cfg(test)]
pub mod fake;
pub mod interface;
pub mod parser;
pub mod prefix;

pub use prefix::Ipv4Prefix;

use crate::error::AppResult;
use std::fmt;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub destination: Ipv4Prefix,
    pub interface: String,
    pub gateway: Option<Ipv4Addr>,
    pub metric: u32,
}

impl Route {
    pub fn via(destination: Ipv4Prefix, interface: &str, gateway: Ipv4Addr) -> Self {
        Route {
            destination,
            interface: interface.to_string(),
            gateway: Some(gateway),
            metric: 0,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination)?;
        if let Some(gw) = self.gateway {
            write!(f, " via {}", gw)?;
        }
        if !self.interface.is_empty() {
            write!(f, " dev {}", self.interface)?;
        }
        if self.metric != 0 {
            write!(f, " metric {}", self.metric)?;
        }
        Ok(())
    }
}

/// Live routing table as read at one point in time
#[derive(Debug, Clone)]
pub struct RouteTableSnapshot {
    pub hostname: String,
    pub routes: Vec<Route>,
    pub timestamp: String,
}

/// Reads and mutates the system routing table
pub trait RoutingTable {
    fn snapshot(&self) -> AppResult<RouteTableSnapshot>;

    fn insert(&mut self, route: &Route) -> AppResult<()>;
}

/// Lists the IPv4 addresses bound to a named interface, in OS order
pub trait InterfaceAddresses {
    fn ipv4_addresses(&self, interface: &str) -> AppResult<Vec<Ipv4Addr>>;
}

/// System collaborator backed by the iproute2 `ip` command
#[derive(Debug, Clone, Copy, Default)]
pub struct IpCommand;
