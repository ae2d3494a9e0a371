// Error kinds for subnet route reconciliation

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interface error: {0}")]
    Interface(String),

    #[error("Failed to read routing table: {0}")]
    RoutingTableParse(String),

    #[error("Failed to execute command: {0}")]
    CommandExecution(String),

    #[error("Failed to insert route for {destination}: {reason}")]
    RouteInsert { destination: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(_) | AppError::Yaml(_) => {
                "Configuration error. Check the config file and command-line arguments.".to_string()
            }
            AppError::Interface(name) => {
                format!("Interface problem ({}). Check the interface name and its IPv4 addresses.", name)
            }
            AppError::RoutingTableParse(_) => {
                "Failed to read routing table. Please ensure the ip command is available.".to_string()
            }
            AppError::CommandExecution(cmd) => {
                format!("Failed to execute command. Make sure {} is installed.", cmd)
            }
            AppError::RouteInsert { destination, .. } => {
                format!("Route to {} was not installed. Check permissions (CAP_NET_ADMIN).", destination)
            }
            AppError::Io(_) => {
                "File system error. Check permissions.".to_string()
            }
            AppError::Serialization(_) => {
                "Unexpected output format from the ip command.".to_string()
            }
        }
    }

    /// Fatal errors abort the run before any routing table mutation
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::RouteInsert { .. })
    }
}
