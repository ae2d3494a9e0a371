mod config;
mod error;
mod reconcile;
mod routes;

use clap::Parser;
use std::process::ExitCode;

use config::{CliArgs, Settings};
use error::AppError;
use reconcile::{Reconciler, RunOutcome};
use routes::IpCommand;

/// Exit code for configuration, interface and routing table read errors
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = match config::log_filter(rust_log.as_deref(), &cli_args.log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    // Initialize logging
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = match Settings::load(&cli_args) {
        Ok(settings) => settings,
        Err(e) => return fail(e),
    };
    tracing::debug!(
        "interface {} from {}, noop: {}, address policy: {:?}",
        settings.interface,
        settings.config_path.display(),
        settings.noop,
        settings.address_policy
    );

    let interfaces = IpCommand;
    let mut table = IpCommand;

    let outcome = match Reconciler::new(&settings, &interfaces, &mut table).run() {
        Ok(outcome) => outcome,
        Err(e) => return fail(e),
    };

    match &outcome {
        RunOutcome::NotMember { address } => {
            tracing::info!("{} is outside every declared subnet", address);
        }
        RunOutcome::Reconciled {
            local,
            diff,
            report,
        } => {
            tracing::info!(
                "subnet {}: {} route(s) missing, {} shadowed, {} injected, {} failed",
                local.prefix,
                report.planned.len(),
                diff.shadowed.len(),
                report.installed.len(),
                report.failure_count()
            );
        }
    }

    ExitCode::from(outcome.exit_code())
}

fn fail(e: AppError) -> ExitCode {
    tracing::error!("{}", e);
    tracing::error!("{}", e.user_message());
    ExitCode::from(if e.is_fatal() { EXIT_FATAL } else { 1 })
}
