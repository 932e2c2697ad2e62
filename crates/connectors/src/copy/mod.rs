//! Staging population: the `CopyAdapter` seam and its registry.

use crate::{
    source::{FileSource, Source, SourceKind},
    sql::{
        base::{classify::RejectedRow, connection::Connection, error::DbError},
        command_builder,
    },
};
use async_trait::async_trait;
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::StagingTableDefinition,
};
use planner::query::ast::common::TableRef;
use thiserror::Error;
use tracing::debug;

pub mod registry;
pub mod table;

/// Maximum files per warehouse-native bulk copy statement.
pub const NATIVE_COPY_CHUNK_SIZE: usize = 1000;

/// Maximum files per statement for external-table style readers.
pub const EXTERNAL_READER_CHUNK_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Database error during copy: {0}")]
    Database(#[from] DbError),

    /// The warehouse rejected rows; `details` lists them.
    #[error("Rejected rows: {message}\n{details}")]
    RejectedRows {
        message: String,
        rows: Vec<RejectedRow>,
        details: String,
    },

    /// An external loader process failed, timed out or was cancelled.
    #[error("Load failed: {message}")]
    LoadFailed {
        message: String,
        stdout: String,
        stderr: String,
    },

    #[error("Adapter {adapter} cannot load source of kind {source_kind}")]
    UnsupportedSource {
        adapter: &'static str,
        source_kind: SourceKind,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fills a staging table from a source.
#[async_trait]
pub trait CopyAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Capability match for a source and a destination warehouse.
    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool;

    /// Loads `source` into `staging` and returns the number of staged rows.
    async fn run_copy_command(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Result<u64, CopyError>;
}

pub(crate) async fn run_statement(conn: &dyn Connection, sql: &str) -> Result<u64, DbError> {
    debug!(backend = %conn.backend(), sql, "Executing copy statement");
    conn.execute(sql).await
}

pub(crate) async fn count_staged_rows(
    conn: &dyn Connection,
    staging: &StagingTableDefinition,
) -> Result<u64, DbError> {
    let sql = command_builder(conn.backend()).count_rows(staging.table());
    debug!(sql, "Counting staged rows");
    conn.query_count(&sql).await
}

/// Quotes a value as a single-quoted literal for copy statement options.
pub(crate) fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn unsupported(adapter: &'static str, source: &Source) -> CopyError {
    CopyError::UnsupportedSource {
        adapter,
        source_kind: source.kind(),
    }
}

pub(crate) fn file_source<'a>(
    adapter: &'static str,
    source: &'a Source,
) -> Result<&'a FileSource, CopyError> {
    match source {
        Source::File(file) => Ok(file),
        Source::Table(_) => Err(unsupported(adapter, source)),
    }
}

/// `<staging> (<col>, ...)` quoted for the backend.
pub(crate) fn staging_target(backend: BackendKind, staging: &StagingTableDefinition) -> String {
    let dialect = command_builder(backend).dialect();
    let columns = staging
        .column_names()
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} ({columns})",
        dialect.render_table_ref(&TableRef::of(staging.table()))
    )
}

/// Object keys without a leading slash.
pub(crate) fn relative_keys(files: &[String]) -> Vec<&str> {
    files.iter().map(|f| f.trim_start_matches('/')).collect()
}
