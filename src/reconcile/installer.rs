// Route installer - applies missing routes one at a time, best effort

use crate::error::AppError;
use crate::routes::{Route, RoutingTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Apply,
    /// Report the plan without touching the routing table
    NoOp,
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub planned: Vec<Route>,
    pub installed: Vec<Route>,
    pub failures: Vec<AppError>,
}

impl InstallReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Insert every route in order. A failed insertion is logged and counted and
/// the next route is still attempted; nothing already inserted is rolled back.
pub fn install_routes<T: RoutingTable + ?Sized>(
    table: &mut T,
    routes: &[Route],
    mode: RunMode,
) -> InstallReport {
    let mut report = InstallReport {
        planned: routes.to_vec(),
        ..Default::default()
    };

    if mode == RunMode::NoOp {
        tracing::info!("noop mode, leaving routing table unchanged");
        return report;
    }

    for route in routes {
        match table.insert(route) {
            Ok(()) => {
                tracing::info!("injected route: {}", route);
                report.installed.push(route.clone());
            }
            Err(e) => {
                tracing::error!("failed to inject route for {}: {}", route.destination, e);
                report.failures.push(e);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::fake::FakeRoutingTable;
    use std::net::Ipv4Addr;

    fn routes(prefixes: &[&str]) -> Vec<Route> {
        prefixes
            .iter()
            .map(|p| Route::via(p.parse().unwrap(), "eth1", Ipv4Addr::new(10, 1, 0, 2)))
            .collect()
    }

    #[test]
    fn test_noop_never_inserts() {
        let mut table = FakeRoutingTable::default();
        let planned = routes(&["10.0.0.0/16", "10.2.0.0/24", "10.3.0.0/24"]);

        let report = install_routes(&mut table, &planned, RunMode::NoOp);
        assert!(table.attempts.is_empty());
        assert_eq!(report.planned, planned);
        assert!(report.installed.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn test_failure_does_not_stop_later_routes() {
        let mut table = FakeRoutingTable::default()
            .rejecting("10.0.0.0/16")
            .rejecting("10.3.0.0/24");
        let planned = routes(&["10.0.0.0/16", "10.2.0.0/24", "10.3.0.0/24", "10.4.0.0/24"]);

        let report = install_routes(&mut table, &planned, RunMode::Apply);
        assert_eq!(table.attempts, planned);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.installed, vec![planned[1].clone(), planned[3].clone()]);
        assert!(!report.is_success());
        assert!(matches!(
            &report.failures[0],
            AppError::RouteInsert { destination, .. } if destination == "10.0.0.0/16"
        ));
    }

    #[test]
    fn test_apply_with_nothing_missing() {
        let mut table = FakeRoutingTable::default();
        let report = install_routes(&mut table, &[], RunMode::Apply);
        assert!(table.attempts.is_empty());
        assert!(report.is_success());
    }
}
