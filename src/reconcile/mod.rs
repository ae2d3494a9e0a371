// Reconcile module - one pass from declared subnets to installed routes

pub mod diff;
pub mod installer;
pub mod plan;
pub mod registry;
pub mod resolver;

pub use diff::{RouteDiff, diff_routes};
pub use installer::{InstallReport, RunMode, install_routes};
pub use registry::{SubnetEntry, SubnetRegistry};
pub use resolver::AddressPolicy;

use crate::config::Settings;
use crate::error::AppResult;
use crate::routes::{InterfaceAddresses, Route, RoutingTable};
use std::net::Ipv4Addr;

/// How a run that did not hit a fatal error ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The host's address is not inside any declared subnet; nothing to do
    NotMember { address: Ipv4Addr },
    Reconciled {
        local: SubnetEntry,
        diff: RouteDiff,
        report: InstallReport,
    },
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::NotMember { .. } => 0,
            RunOutcome::Reconciled { report, .. } if report.is_success() => 0,
            RunOutcome::Reconciled { .. } => 1,
        }
    }
}

/// Runs the reconciliation against injected system collaborators
pub struct Reconciler<'a, I: ?Sized, T: ?Sized> {
    settings: &'a Settings,
    interfaces: &'a I,
    table: &'a mut T,
}

impl<'a, I, T> Reconciler<'a, I, T>
where
    I: InterfaceAddresses + ?Sized,
    T: RoutingTable + ?Sized,
{
    pub fn new(settings: &'a Settings, interfaces: &'a I, table: &'a mut T) -> Self {
        Reconciler {
            settings,
            interfaces,
            table,
        }
    }

    /// Fatal errors are returned before the routing table is touched
    pub fn run(&mut self) -> AppResult<RunOutcome> {
        let registry = SubnetRegistry::from_declarations(&self.settings.subnets)?;
        let interface = self.settings.interface.as_str();
        tracing::debug!("{} subnet(s) declared", registry.entries().len());

        tracing::info!("looking for IPs assigned to interface: {}", interface);
        let addresses = self.interfaces.ipv4_addresses(interface)?;

        let membership =
            match resolver::resolve(&registry, interface, &addresses, self.settings.address_policy)? {
                Some(membership) => membership,
                None => {
                    let address = addresses[0];
                    tracing::info!("no matching subnets found for {}, nothing to do", address);
                    return Ok(RunOutcome::NotMember { address });
                }
            };
        tracing::info!(
            "assuming subnet is: {} (from {})",
            membership.subnet.prefix,
            membership.address
        );
        if !membership.subnet.meta.extra.is_empty() {
            tracing::debug!("subnet metadata: {:?}", membership.subnet.meta.extra);
        }

        let required = plan::required_routes(&registry, membership.subnet, interface)?;
        log_routes("routes for these subnets are required:", &required);

        let snapshot = self.table.snapshot()?;
        tracing::debug!(
            "read {} routes from {} at {}",
            snapshot.routes.len(),
            snapshot.hostname,
            snapshot.timestamp
        );
        log_routes("routes already exist for:", &snapshot.routes);

        let diff = diff_routes(&required, &snapshot);
        for shadowed in &diff.shadowed {
            tracing::warn!(
                "route to {} exists as '{}', not '{}'; leaving it alone",
                shadowed.required.destination,
                shadowed.existing,
                shadowed.required
            );
        }
        log_routes("need to inject routes for:", &diff.missing);

        let mode = if self.settings.noop {
            RunMode::NoOp
        } else {
            RunMode::Apply
        };
        let report = install_routes(&mut *self.table, &diff.missing, mode);

        if !report.is_success() {
            tracing::error!(
                "{} of {} route(s) failed to inject",
                report.failure_count(),
                report.planned.len()
            );
        }

        Ok(RunOutcome::Reconciled {
            local: membership.subnet.clone(),
            diff,
            report,
        })
    }
}

fn log_routes(heading: &str, routes: &[Route]) {
    tracing::info!("{}", heading);
    for route in routes {
        tracing::info!(" - {}", route.destination);
    }
}
