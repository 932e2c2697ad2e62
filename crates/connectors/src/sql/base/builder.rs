//! The per-dialect SQL command set used by the import orchestrators.
//!
//! Builders are pure: they turn table definitions and options into SQL text
//! and never touch a connection.

use crate::sql::base::{capabilities::BackendCapabilities, projection::NullStyle};
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::{
        layout::TableLayout,
        table::{StagingTableDefinition, TableDefinition},
    },
};
use planner::{
    query::{
        ast::{
            common::TableRef,
            expr::{Expr, FunctionCall},
            statement::{RenameTable, TransactionControl, TruncateTable},
        },
        builder::{drop_table::DropTableBuilder, select::SelectBuilder},
        dialect::{self, Dialect},
        renderer::to_sql,
    },
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("Columns [{columns}] were not found in table {table}")]
    UnknownColumns { table: String, columns: String },

    #[error("Primary key columns [{columns}] are not among the imported columns of table {table}")]
    UnknownPrimaryKeys { table: String, columns: String },

    #[error("Table {table} has no primary key")]
    MissingPrimaryKey { table: String },

    #[error("{operation} is not supported by {backend}")]
    Unsupported {
        operation: &'static str,
        backend: BackendKind,
    },
}

/// The SQL operation set every warehouse exposes to the orchestrators.
///
/// Statement shapes that differ between warehouses (dedup, delete-old,
/// update, insert, CTAS, staging DDL) are implemented per dialect; purely
/// structural statements render through the dialect by default. An empty
/// string means "nothing to run" and is skipped by the caller.
pub trait SqlCommandBuilder: Send + Sync {
    fn backend(&self) -> BackendKind;

    fn dialect(&self) -> &'static dyn Dialect {
        dialect::for_backend(self.backend())
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::for_backend(self.backend())
    }

    /// Physical layout for staging and dedup scratch tables.
    fn staging_layout(&self) -> TableLayout {
        TableLayout::default()
    }

    /// How `''` is turned into `NULL` for columns listed for conversion.
    fn null_style(&self) -> NullStyle {
        NullStyle::Nullif
    }

    fn create_staging(&self, staging: &StagingTableDefinition) -> String;

    /// Copies one row per primary key from `source` into `dedup`.
    /// Returns `""` when `primary_keys` is empty.
    fn dedup(
        &self,
        source: &StagingTableDefinition,
        dedup: &StagingTableDefinition,
        primary_keys: &[String],
    ) -> Result<String, BuilderError>;

    /// Removes staging rows whose primary key already exists in `destination`.
    fn delete_old_items(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
    ) -> Result<String, BuilderError>;

    /// Updates destination rows that have a changed counterpart in staging.
    /// Returns `""` when only primary-key columns are imported.
    fn update_with_pk(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError>;

    fn insert_all_into_target(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError>;

    /// `CREATE TABLE <target_name> AS SELECT ...` producing the final shape
    /// of `destination` from `source`.
    fn ctas_insert_all(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        target_name: &str,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError>;

    /// Like `ctas_insert_all`, keeping one row per destination primary key.
    fn ctas_dedup(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        target_name: &str,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError>;

    fn truncate(&self, table: &TableDefinition) -> String {
        to_sql(
            &TruncateTable {
                table: TableRef::of(table),
            },
            self.dialect(),
        )
    }

    fn drop_table(&self, table: &TableDefinition) -> String {
        to_sql(&DropTableBuilder::new(TableRef::of(table)).build(), self.dialect())
    }

    fn drop_table_if_exists(&self, table: &TableDefinition) -> Result<String, BuilderError> {
        if !self.dialect().supports_drop_if_exists() {
            return Err(BuilderError::Unsupported {
                operation: "DROP TABLE IF EXISTS",
                backend: self.backend(),
            });
        }
        let ast = DropTableBuilder::new(TableRef::of(table)).if_exists().build();
        Ok(to_sql(&ast, self.dialect()))
    }

    fn rename(&self, table: &TableDefinition, new_name: &str) -> String {
        let ast = RenameTable {
            table: TableRef::of(table),
            new_name: new_name.to_string(),
        };
        to_sql(&ast, self.dialect())
    }

    fn begin_transaction(&self) -> String {
        to_sql(&TransactionControl::Begin, self.dialect())
    }

    fn commit_transaction(&self) -> String {
        to_sql(&TransactionControl::Commit, self.dialect())
    }

    fn rollback_transaction(&self) -> String {
        to_sql(&TransactionControl::Rollback, self.dialect())
    }

    fn count_rows(&self, table: &TableDefinition) -> String {
        let count = Expr::FunctionCall(FunctionCall {
            name: "COUNT".to_string(),
            args: vec![],
            wildcard: true,
        });
        let select = SelectBuilder::new()
            .select(vec![count])
            .from(TableRef::of(table), None)
            .build();
        to_sql(&select, self.dialect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use model::{
        core::data_type::DataType,
        import::options::ImportOptions,
        schema::{
            column::ColumnDefinition,
            table::{StagingTableDefinition, TableDefinition},
        },
    };

    pub const TS: &str = "2024-05-01 10:00:00";

    pub fn destination(schema: &str) -> TableDefinition {
        TableDefinition::new(
            schema,
            "accounts",
            vec![
                ColumnDefinition::new("id", DataType::Int),
                ColumnDefinition::new("name", DataType::VarChar).with_length("255"),
                ColumnDefinition::new("_timestamp", DataType::Timestamp),
            ],
        )
        .with_primary_keys(&["id"])
    }

    pub fn staging(schema: &str) -> StagingTableDefinition {
        StagingTableDefinition::untyped(TableDefinition::new(
            schema,
            "__temp_stage",
            vec![ColumnDefinition::text("id"), ColumnDefinition::text("name")],
        ))
    }

    pub fn dedup(schema: &str) -> StagingTableDefinition {
        StagingTableDefinition::untyped(TableDefinition::new(
            schema,
            "__temp_dedup",
            vec![ColumnDefinition::text("id"), ColumnDefinition::text("name")],
        ))
    }

    pub fn options() -> ImportOptions {
        ImportOptions::builder(&["id", "name"])
            .convert_empty_values_to_null(&["name"])
            .build()
    }

    pub fn options_with_timestamp() -> ImportOptions {
        ImportOptions::builder(&["id", "name"])
            .convert_empty_values_to_null(&["name"])
            .use_timestamp(true)
            .build()
    }

    pub fn pk() -> Vec<String> {
        vec!["id".to_string()]
    }
}
