// Route diff engine - required routes against the live table

use crate::routes::{Route, RouteTableSnapshot};

/// Existing route with the required destination but a different next hop or device
#[derive(Debug, Clone, PartialEq)]
pub struct Shadowed {
    pub required: Route,
    pub existing: Route,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDiff {
    /// Required routes with no live route to the same destination, in required order
    pub missing: Vec<Route>,
    /// Satisfied by destination only; left untouched
    pub shadowed: Vec<Shadowed>,
}

/// Destination-only equality: any live route to the same prefix satisfies the
/// required one, whichever interface or gateway it uses.
pub fn covers(existing: &Route, required: &Route) -> bool {
    existing.destination == required.destination
}

fn same_next_hop(existing: &Route, required: &Route) -> bool {
    existing.gateway == required.gateway && existing.interface == required.interface
}

pub fn diff_routes(required: &[Route], snapshot: &RouteTableSnapshot) -> RouteDiff {
    let mut diff = RouteDiff::default();

    for route in required {
        let covering: Vec<&Route> = snapshot
            .routes
            .iter()
            .filter(|existing| covers(existing, route))
            .collect();

        match covering.first() {
            None => diff.missing.push(route.clone()),
            Some(first) if !covering.iter().any(|existing| same_next_hop(existing, route)) => {
                diff.shadowed.push(Shadowed {
                    required: route.clone(),
                    existing: (*first).clone(),
                });
            }
            Some(_) => {}
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    fn snapshot(routes: Vec<Route>) -> RouteTableSnapshot {
        RouteTableSnapshot {
            hostname: "testhost".to_string(),
            routes,
            timestamp: String::new(),
        }
    }

    fn via(dst: &str, dev: &str, gw: [u8; 4]) -> Route {
        Route::via(dst.parse().unwrap(), dev, Ipv4Addr::from(gw))
    }

    #[test]
    fn test_missing_routes_keep_required_order() {
        let required = vec![
            via("10.3.0.0/24", "eth1", [10, 1, 0, 2]),
            via("10.0.0.0/16", "eth1", [10, 1, 0, 2]),
            via("10.2.0.0/24", "eth1", [10, 1, 0, 2]),
        ];
        let live = snapshot(vec![via("10.0.0.0/16", "eth1", [10, 1, 0, 2])]);

        let diff = diff_routes(&required, &live);
        assert_eq!(diff.missing, vec![required[0].clone(), required[2].clone()]);
        assert!(diff.shadowed.is_empty());
    }

    #[test]
    fn test_other_next_hop_counts_as_present() {
        let required = vec![via("10.0.0.0/16", "eth1", [10, 1, 0, 2])];
        let existing = via("10.0.0.0/16", "eth0", [192, 168, 1, 1]);
        let live = snapshot(vec![existing.clone()]);

        let diff = diff_routes(&required, &live);
        assert!(diff.missing.is_empty());
        assert_eq!(
            diff.shadowed,
            vec![Shadowed {
                required: required[0].clone(),
                existing,
            }]
        );
    }

    #[test]
    fn test_host_route_matches_bare_address() {
        let required = vec![via("10.2.3.4/32", "eth1", [10, 1, 0, 2])];
        let live = snapshot(crate::routes::parser::parse_ip_route(
            "10.2.3.4 via 10.1.0.2 dev eth1\n",
        ));

        assert_eq!(diff_routes(&required, &live), RouteDiff::default());
    }

    #[test]
    fn test_covers_ignores_gateway_and_interface() {
        let a = via("10.0.0.0/16", "eth1", [10, 1, 0, 2]);
        let b = via("10.0.0.0/16", "eth7", [10, 9, 9, 9]);
        let c = via("10.0.0.0/17", "eth1", [10, 1, 0, 2]);
        assert!(covers(&a, &b));
        assert!(!covers(&a, &c));
    }
}
