use thiserror::Error;

/// All errors coming from the warehouse/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Low‐level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postgres-wire driver error (Redshift).
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Error text reported by any other warehouse driver.
    #[error("Driver error: {0}")]
    Driver(String),

    /// A query returned something other than what the caller expected.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DbError {
    /// The text the driver reported, without the wrapper prefix.
    pub fn message(&self) -> String {
        match self {
            DbError::Postgres(err) => match err.as_db_error() {
                Some(db_err) => db_err.message().to_string(),
                None => err.to_string(),
            },
            DbError::Driver(message)
            | DbError::UnexpectedResult(message)
            | DbError::Unknown(message) => message.clone(),
            DbError::Io(err) => err.to_string(),
        }
    }
}

/// Errors happening during connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("Postgres connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),
}
