//! A connection that runs nothing and remembers every statement.

use crate::sql::base::{
    connection::{Connection, TextRow},
    error::DbError,
};
use async_trait::async_trait;
use model::core::backend::BackendKind;
use tokio::sync::Mutex;
use tracing::debug;

/// Records statements instead of executing them.
///
/// Used by dry runs to print the SQL an import would issue, and by tests to
/// check statement order. Statements that contain a configured fragment fail
/// with a driver error, which lets callers rehearse failure paths.
pub struct RecordingConnection {
    backend: BackendKind,
    statements: Mutex<Vec<String>>,
    failures: Vec<(String, String)>,
    affected_rows: u64,
    count: u64,
}

impl RecordingConnection {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            statements: Mutex::new(Vec::new()),
            failures: Vec::new(),
            affected_rows: 0,
            count: 0,
        }
    }

    /// Fails any statement containing `fragment` with `message`.
    pub fn fail_on(mut self, fragment: &str, message: &str) -> Self {
        self.failures.push((fragment.to_string(), message.to_string()));
        self
    }

    /// Rows reported as affected by every `execute`.
    pub fn with_affected_rows(mut self, rows: u64) -> Self {
        self.affected_rows = rows;
        self
    }

    /// Value returned by single-value queries.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub async fn statements(&self) -> Vec<String> {
        self.statements.lock().await.clone()
    }

    async fn record(&self, sql: &str) -> Result<(), DbError> {
        debug!(backend = %self.backend, sql, "Recording statement");
        self.statements.lock().await.push(sql.to_string());
        match self.failures.iter().find(|(fragment, _)| sql.contains(fragment)) {
            Some((_, message)) => Err(DbError::Driver(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        self.record(sql).await?;
        Ok(self.affected_rows)
    }

    async fn query_rows(&self, sql: &str) -> Result<Vec<TextRow>, DbError> {
        self.record(sql).await?;
        Ok(vec![vec![Some(self.count.to_string())]])
    }
}
