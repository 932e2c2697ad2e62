use crate::{
    error::AdapterError,
    sql::{base::connection::Connection, redshift::connection::RedshiftConnection},
};
use model::core::backend::BackendKind;
use std::sync::Arc;

/// Opens a warehouse connection for `kind`.
///
/// Only the Postgres-wire driver (Redshift) is bundled. Other warehouses are
/// reached through caller-provided `Connection` implementations.
pub async fn connect(kind: BackendKind, url: &str) -> Result<Arc<dyn Connection>, AdapterError> {
    match kind {
        BackendKind::Redshift => {
            let conn = RedshiftConnection::connect(url).await?;
            Ok(Arc::new(conn))
        }
        other => Err(AdapterError::UnsupportedBackend(other)),
    }
}
