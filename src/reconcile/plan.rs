// Route requirement calculator

use super::registry::{SubnetEntry, SubnetRegistry};
use crate::error::AppResult;
use crate::routes::Route;

/// One route per declared subnet other than the local one, all through the
/// local subnet's gateway on `interface`.
pub fn required_routes(
    registry: &SubnetRegistry,
    local: &SubnetEntry,
    interface: &str,
) -> AppResult<Vec<Route>> {
    let gateway = local.gateway()?;
    tracing::info!("assuming gateway is: {}", gateway);

    let routes = registry
        .entries()
        .iter()
        .filter(|entry| entry.prefix != local.prefix)
        .map(|entry| Route::via(entry.prefix, interface, gateway))
        .collect();

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::reconcile::registry::declare;
    use std::net::Ipv4Addr;

    #[test]
    fn test_required_routes_exclude_local_subnet() {
        let registry = SubnetRegistry::from_declarations(&declare(&[
            ("10.0.0.0/16", Some("10.0.0.1")),
            ("10.1.0.0/24", Some("10.1.0.2")),
            ("10.2.0.0/24", None),
        ]))
        .unwrap();
        let local = &registry.entries()[1];

        let routes = required_routes(&registry, local, "eth1").unwrap();
        let gw = Ipv4Addr::new(10, 1, 0, 2);
        assert_eq!(
            routes,
            vec![
                Route::via("10.0.0.0/16".parse().unwrap(), "eth1", gw),
                Route::via("10.2.0.0/24".parse().unwrap(), "eth1", gw),
            ]
        );
    }

    #[test]
    fn test_single_subnet_needs_no_routes() {
        let registry =
            SubnetRegistry::from_declarations(&declare(&[("10.1.0.0/24", Some("10.1.0.2"))])).unwrap();
        let routes = required_routes(&registry, &registry.entries()[0], "eth1").unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn test_local_subnet_without_gateway() {
        let registry = SubnetRegistry::from_declarations(&declare(&[
            ("10.0.0.0/16", Some("10.0.0.1")),
            ("10.1.0.0/24", None),
        ]))
        .unwrap();
        let err = required_routes(&registry, &registry.entries()[1], "eth1").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
