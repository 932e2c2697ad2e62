use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating an import settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings document is not valid JSON or does not match the schema.
    #[error("Invalid settings document: {0}")]
    Json(#[from] serde_json::Error),

    /// A `${NAME}` reference has no value and no default.
    #[error("Environment variable '{0}' is not set")]
    UnresolvedVariable(String),

    /// A `${` without its closing brace.
    #[error("Unterminated variable reference in '{0}'")]
    UnterminatedReference(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// One or more settings failed validation.
    #[error("Settings validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}
