use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::core::backend::BackendKind;

/// One row of a text-mode result set. `None` is SQL `NULL`.
pub type TextRow = Vec<Option<String>>;

/// A single warehouse session.
///
/// Statements run one at a time in submission order; `BEGIN`/`COMMIT`
/// issued through `execute` scope the statements in between.
#[async_trait]
pub trait Connection: Send + Sync {
    fn backend(&self) -> BackendKind;

    /// Executes a statement and returns the number of affected rows
    /// (0 for DDL).
    async fn execute(&self, sql: &str) -> Result<u64, DbError>;

    /// Runs a query and returns its rows as text.
    async fn query_rows(&self, sql: &str) -> Result<Vec<TextRow>, DbError>;

    /// Runs a single-value query such as `SELECT COUNT(*) ...`.
    async fn query_count(&self, sql: &str) -> Result<u64, DbError> {
        let rows = self.query_rows(sql).await?;
        let value = rows
            .first()
            .and_then(|row| row.first())
            .cloned()
            .flatten()
            .ok_or_else(|| DbError::UnexpectedResult(format!("No value returned by: {sql}")))?;
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| DbError::UnexpectedResult(format!("Not a count: {value}")))
    }
}
