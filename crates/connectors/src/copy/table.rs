use crate::{
    copy::{CopyAdapter, CopyError, run_statement, unsupported},
    source::Source,
    sql::{
        base::{connection::Connection, statements},
        command_builder,
    },
};
use async_trait::async_trait;
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::{
        column::ColumnDefinition,
        table::{StagingTableDefinition, TableDefinition},
    },
};
use tracing::info;

/// Copies rows from another table in the same warehouse with
/// `INSERT INTO <staging> SELECT ... FROM <table>`.
#[derive(Debug, Default, Clone)]
pub struct TableCopyAdapter;

#[async_trait]
impl CopyAdapter for TableCopyAdapter {
    fn name(&self) -> &'static str {
        "table-copy"
    }

    fn is_supported(&self, source: &Source, _backend: BackendKind) -> bool {
        matches!(source, Source::Table(_))
    }

    async fn run_copy_command(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Result<u64, CopyError> {
        let Source::Table(table) = source else {
            return Err(unsupported(self.name(), source));
        };

        let source_table = TableDefinition::new(
            &table.schema,
            &table.name,
            table.columns.iter().map(|c| ColumnDefinition::text(c)).collect(),
        );
        let sql = statements::copy_table(
            command_builder(conn.backend()),
            &source_table,
            staging,
            &options.columns,
        );
        let rows = run_statement(conn, &sql).await?;
        info!(source = %table.name, staging = staging.name(), rows, "Copied table into staging");
        Ok(rows)
    }
}
