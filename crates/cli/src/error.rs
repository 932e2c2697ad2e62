use connectors::{error::AdapterError, sql::base::error::DbError};
use engine_config::settings::error::SettingsError;
use engine_core::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Failed to connect: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Settings file has no connection_url")]
    MissingConnectionUrl,

    #[error("Shutdown requested")]
    ShutdownRequested,
}
