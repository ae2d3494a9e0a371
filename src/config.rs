// Configuration management for subnet-route-sync
// Supports CLI arguments, a YAML config file found on a search path, and environment variables

use crate::error::{AppError, AppResult};
use crate::reconcile::AddressPolicy;
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

pub const CONFIG_NAME: &str = "subnet-route-sync";

/// Install static routes to every declared subnet via the local subnet's gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "subnet-route-sync")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (replaces the default search path)
    #[arg(short, long, value_name = "PATH", env = "SUBNET_ROUTE_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not change routing table
    #[arg(short = 'n', long = "noop", overrides_with = "no_noop")]
    pub noop: bool,

    /// Change the routing table (default)
    #[arg(long = "no-noop", overrides_with = "noop")]
    #[allow(dead_code)] // Only cancels an earlier --noop
    pub no_noop: bool,

    /// Interface to inspect (overrides the config file)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Try every IPv4 address on the interface instead of only the first
    #[arg(long)]
    pub any_address: bool,

    /// Logging level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Configuration file structure (YAML format)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Name of the network interface to inspect
    #[serde(default)]
    pub interface: Option<String>,

    /// Declared subnets keyed by CIDR prefix, in file order
    #[serde(default)]
    pub subnets: Option<serde_yaml::Mapping>,
}

/// Per-subnet metadata. Only `gw` is interpreted; other keys are carried along.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubnetMeta {
    #[serde(default)]
    pub gw: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Subnet declarations as (prefix string, metadata) pairs in file order
    pub fn subnet_declarations(&self) -> AppResult<Vec<(String, SubnetMeta)>> {
        let subnets = self
            .subnets
            .as_ref()
            .ok_or_else(|| AppError::Config("\"subnets\" key missing from conf file".to_string()))?;

        let mut declarations = Vec::with_capacity(subnets.len());
        for (key, value) in subnets {
            let prefix = key
                .as_str()
                .ok_or_else(|| AppError::Config(format!("subnet key {:?} is not a string", key)))?;

            let meta = if value.is_null() {
                SubnetMeta::default()
            } else {
                serde_yaml::from_value(value.clone()).map_err(|e| {
                    AppError::Config(format!("invalid metadata for subnet {}: {}", prefix, e))
                })?
            };

            declarations.push((prefix.to_string(), meta));
        }

        Ok(declarations)
    }
}

/// Default search order, first readable file wins
pub fn default_config_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let file_name = format!("{}.yaml", CONFIG_NAME);

    let mut paths = vec![PathBuf::from(".").join(&file_name)];
    if let Some(home) = home {
        paths.push(home.join(&file_name));
    }
    paths.push(PathBuf::from("/usr/local/etc").join(&file_name));
    paths.push(PathBuf::from("/etc").join(CONFIG_NAME).join(&file_name));
    paths
}

/// Pick the first path that exists and can be opened for reading
pub fn find_config_file(paths: &[PathBuf]) -> AppResult<PathBuf> {
    paths
        .iter()
        .find(|path| path.is_file() && File::open(path).is_ok())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            AppError::Config(format!(
                "unable to find a conf file at these path(s): {}",
                tried.join(", ")
            ))
        })
}

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub interface: String,
    pub subnets: Vec<(String, SubnetMeta)>,
    pub noop: bool,
    pub address_policy: AddressPolicy,
}

impl Settings {
    /// Load configuration from all sources (CLI args, config file)
    /// Priority: CLI args > Config file
    pub fn load(cli_args: &CliArgs) -> AppResult<Self> {
        let search_paths = match &cli_args.config {
            Some(path) => vec![path.clone()],
            None => {
                let home = std::env::var_os("HOME").map(PathBuf::from);
                default_config_paths(home.as_deref())
            }
        };

        let config_path = find_config_file(&search_paths)?;
        tracing::info!("Loading configuration from: {}", config_path.display());
        let config_file = ConfigFile::from_path(&config_path)?;

        Self::merge(cli_args, config_path, config_file)
    }

    fn merge(cli_args: &CliArgs, config_path: PathBuf, config_file: ConfigFile) -> AppResult<Self> {
        let interface = cli_args
            .interface
            .clone()
            .or(config_file.interface.clone())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Config("\"interface\" key missing from conf file".to_string()))?;

        let subnets = config_file.subnet_declarations()?;

        let address_policy = if cli_args.any_address {
            AddressPolicy::FirstMatching
        } else {
            AddressPolicy::FirstOnly
        };

        Ok(Settings {
            config_path,
            interface,
            subnets,
            noop: cli_args.noop,
            address_policy,
        })
    }
}

pub fn parse_log_level(level_str: &str) -> anyhow::Result<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(anyhow::anyhow!("Invalid log level: {}", level_str)),
    }
}

/// Build the log filter from RUST_LOG directives, falling back to `--log-level`
/// when RUST_LOG is unset or does not parse.
pub fn log_filter(rust_log: Option<&str>, level_str: &str) -> anyhow::Result<EnvFilter> {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return Ok(filter),
            Err(e) => eprintln!("Ignoring RUST_LOG={:?}: {}", directives, e),
        }
    }

    let level = parse_log_level(level_str)?;
    Ok(EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}
