//! Runs builder output on a connection, one statement at a time.

use crate::error::ImportError;
use connectors::sql::{
    base::{builder::SqlCommandBuilder, connection::Connection},
    command_builder,
};
use model::{core::backend::BackendKind, schema::table::TableDefinition};
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Clone, Copy)]
pub struct Executor<'a> {
    conn: &'a dyn Connection,
    builder: &'static dyn SqlCommandBuilder,
}

impl<'a> Executor<'a> {
    pub fn new(conn: &'a dyn Connection) -> Self {
        Self {
            conn,
            builder: command_builder(conn.backend()),
        }
    }

    pub fn conn(&self) -> &'a dyn Connection {
        self.conn
    }

    pub fn builder(&self) -> &'static dyn SqlCommandBuilder {
        self.builder
    }

    pub fn backend(&self) -> BackendKind {
        self.conn.backend()
    }

    /// Executes `sql` and returns the affected row count. Empty statements
    /// are skipped and report zero rows.
    pub async fn run(&self, context: &str, sql: &str) -> Result<u64, ImportError> {
        if sql.is_empty() {
            debug!(context, "Skipping empty statement");
            return Ok(0);
        }
        debug!(backend = %self.backend(), context, sql, "Executing statement");
        let started = Instant::now();
        let rows = self
            .conn
            .execute(sql)
            .await
            .map_err(|e| ImportError::backend(context, e))?;
        debug!(context, rows, elapsed_ms = started.elapsed().as_millis() as u64, "Statement finished");
        Ok(rows)
    }

    pub async fn count(&self, context: &str, table: &TableDefinition) -> Result<u64, ImportError> {
        let sql = self.builder.count_rows(table);
        debug!(backend = %self.backend(), context, sql, "Executing query");
        self.conn
            .query_count(&sql)
            .await
            .map_err(|e| ImportError::backend(context, e))
    }

    pub async fn begin(&self) -> Result<(), ImportError> {
        self.run("Begin transaction", &self.builder.begin_transaction())
            .await
            .map(|_| ())
    }

    pub async fn commit(&self) -> Result<(), ImportError> {
        self.run("Commit transaction", &self.builder.commit_transaction())
            .await
            .map(|_| ())
    }

    /// Rolls back after `error` and hands it back. A failed rollback is
    /// logged; `error` stays the one reported.
    pub async fn rollback(&self, error: ImportError) -> ImportError {
        let sql = self.builder.rollback_transaction();
        if let Err(e) = self.run("Rollback transaction", &sql).await {
            warn!(backend = %self.backend(), error = %e, original = %error, "Rollback failed");
        }
        error
    }

    /// Commits when `outcome` is a success and rolls back otherwise.
    pub async fn finish_transaction<T>(
        &self,
        outcome: Result<T, ImportError>,
    ) -> Result<T, ImportError> {
        match outcome {
            Ok(value) => match self.commit().await {
                Ok(()) => Ok(value),
                Err(e) => Err(self.rollback(e).await),
            },
            Err(e) => Err(self.rollback(e).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::sql::base::recording::RecordingConnection;

    #[tokio::test]
    async fn test_empty_statements_are_skipped() {
        let conn = RecordingConnection::new(BackendKind::Exasol);
        let executor = Executor::new(&conn);
        executor.begin().await.unwrap();
        executor.commit().await.unwrap();
        assert_eq!(conn.statements().await, vec!["COMMIT".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_body_rolls_back() {
        let conn = RecordingConnection::new(BackendKind::Snowflake)
            .fail_on("DELETE", "constraint violated");
        let executor = Executor::new(&conn);

        executor.begin().await.unwrap();
        executor.run("Insert", "INSERT INTO t VALUES (1)").await.unwrap();
        let outcome = executor.run("Delete", "DELETE FROM t").await;
        let err = executor.finish_transaction(outcome).await.unwrap_err();

        assert_eq!(err.to_string(), "Delete failed: Driver error: constraint violated");
        assert_eq!(
            conn.statements().await,
            vec![
                "BEGIN TRANSACTION".to_string(),
                "INSERT INTO t VALUES (1)".to_string(),
                "DELETE FROM t".to_string(),
                "ROLLBACK".to_string(),
            ]
        );
    }
}
