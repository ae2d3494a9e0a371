// In-memory collaborators for exercising the reconciler without touching the host

use super::{InterfaceAddresses, Ipv4Prefix, Route, RouteTableSnapshot, RoutingTable};
use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::net::Ipv4Addr;

#[derive(Debug, Default)]
pub struct FakeInterfaces {
    addresses: HashMap<String, Vec<Ipv4Addr>>,
}

impl FakeInterfaces {
    pub fn with(interface: &str, addresses: &[Ipv4Addr]) -> Self {
        let mut fake = FakeInterfaces::default();
        fake.addresses.insert(interface.to_string(), addresses.to_vec());
        fake
    }
}

impl InterfaceAddresses for FakeInterfaces {
    fn ipv4_addresses(&self, interface: &str) -> AppResult<Vec<Ipv4Addr>> {
        Ok(self.addresses.get(interface).cloned().unwrap_or_default())
    }
}

/// Routing table that records every insertion attempt
#[derive(Debug, Default)]
pub struct FakeRoutingTable {
    pub routes: Vec<Route>,
    pub attempts: Vec<Route>,
    pub reject: Vec<Ipv4Prefix>,
    pub unreadable: bool,
}

impl FakeRoutingTable {
    pub fn with_routes(routes: Vec<Route>) -> Self {
        FakeRoutingTable {
            routes,
            ..Default::default()
        }
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.unreadable = true;
        self
    }

    pub fn rejecting(mut self, destination: &str) -> Self {
        self.reject.push(destination.parse().unwrap());
        self
    }
}

impl RoutingTable for FakeRoutingTable {
    fn snapshot(&self) -> AppResult<RouteTableSnapshot> {
        if self.unreadable {
            return Err(AppError::RoutingTableParse(
                "Cannot open netlink socket: Permission denied".to_string(),
            ));
        }
        Ok(RouteTableSnapshot {
            hostname: "testhost".to_string(),
            routes: self.routes.clone(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        })
    }

    fn insert(&mut self, route: &Route) -> AppResult<()> {
        self.attempts.push(route.clone());
        if self.reject.contains(&route.destination) {
            return Err(AppError::RouteInsert {
                destination: route.destination.to_string(),
                reason: "RTNETLINK answers: Operation not permitted".to_string(),
            });
        }
        self.routes.push(route.clone());
        Ok(())
    }
}
