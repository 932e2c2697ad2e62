use crate::error::CliError;
use connectors::adapter;
use model::core::backend::BackendKind;
use tracing::{error, info};

/// Opens a connection and runs `SELECT 1`.
pub async fn ping(backend: BackendKind, url: &str) -> Result<(), CliError> {
    info!(%backend, "Pinging warehouse");

    let conn = adapter::connect(backend, url).await.map_err(|e| {
        error!(%backend, "Connection failed: {e}");
        e
    })?;
    let value = conn.query_count("SELECT 1").await.map_err(|e| {
        error!(%backend, "Ping query failed: {e}");
        e
    })?;

    if value != 1 {
        error!(%backend, value, "Ping returned an unexpected value");
        return Err(CliError::Config(format!("Ping returned {value} instead of 1")));
    }
    info!(%backend, "Connection OK");
    Ok(())
}
