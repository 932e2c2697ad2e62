//! Unconditional removal of staging and dedup scratch tables.

use crate::{error::ImportError, executor::Executor};
use connectors::sql::base::builder::BuilderError;
use model::schema::table::TableDefinition;
use tracing::{info, warn};

/// `DROP TABLE IF EXISTS` where the dialect has it, plain `DROP TABLE`
/// otherwise.
pub async fn drop_table(executor: &Executor<'_>, table: &TableDefinition) -> Result<(), ImportError> {
    let sql = match executor.builder().drop_table_if_exists(table) {
        Ok(sql) => sql,
        Err(BuilderError::Unsupported { .. }) => executor.builder().drop_table(table),
        Err(e) => return Err(e.into()),
    };
    executor
        .run("Drop table", &sql)
        .await
        .map_err(|e| match e {
            ImportError::Backend { source, .. } => ImportError::Cleanup {
                table: table.name.clone(),
                source,
            },
            other => other,
        })?;
    info!(table = %table.name, "Dropped scratch table");
    Ok(())
}

/// Drops `table` once the work that used it has finished, whatever its
/// outcome. A cleanup failure is returned only when `outcome` succeeded;
/// otherwise it is logged and the original error wins.
pub async fn finish<T>(
    executor: &Executor<'_>,
    table: &TableDefinition,
    outcome: Result<T, ImportError>,
) -> Result<T, ImportError> {
    let cleanup = drop_table(executor, table).await;
    match (outcome, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(original), Ok(())) => Err(original),
        (Err(original), Err(e)) => {
            warn!(
                table = %table.name,
                error = %e,
                original = %original,
                "Cleanup failed while another error is pending"
            );
            Err(original)
        }
    }
}
