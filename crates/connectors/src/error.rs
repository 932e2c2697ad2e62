use crate::sql::base::error::{ConnectorError, DbError};
use model::core::backend::BackendKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// No driver ships for the requested warehouse.
    #[error("No connection driver available for backend: {0}")]
    UnsupportedBackend(BackendKind),

    /// Failed to initialize a connection.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    /// Database-related error.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}
