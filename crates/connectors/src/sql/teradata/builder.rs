use crate::sql::base::{
    builder::{BuilderError, SqlCommandBuilder},
    statements::{self, DeleteStyle, UpdateTarget},
};
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::{
        layout::{TableIndex, TableLayout},
        table::{StagingTableDefinition, TableDefinition},
    },
};

#[derive(Debug, Default, Clone, Copy)]
pub struct TeradataCommandBuilder;

impl TeradataCommandBuilder {
    fn no_ctas(&self) -> BuilderError {
        BuilderError::Unsupported {
            operation: "CREATE TABLE AS SELECT",
            backend: self.backend(),
        }
    }
}

impl SqlCommandBuilder for TeradataCommandBuilder {
    fn backend(&self) -> BackendKind {
        BackendKind::Teradata
    }

    fn staging_layout(&self) -> TableLayout {
        TableLayout::new(None, Some(TableIndex::NoPrimaryIndex))
    }

    fn create_staging(&self, staging: &StagingTableDefinition) -> String {
        statements::create_table(self, staging.table(), false)
    }

    fn dedup(
        &self,
        source: &StagingTableDefinition,
        dedup: &StagingTableDefinition,
        primary_keys: &[String],
    ) -> Result<String, BuilderError> {
        statements::dedup(self, source, dedup, primary_keys)
    }

    fn delete_old_items(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
    ) -> Result<String, BuilderError> {
        statements::delete_old_items(self, staging, destination, options, DeleteStyle::Exists)
    }

    fn update_with_pk(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        statements::update_with_pk(
            self,
            staging,
            destination,
            options,
            timestamp,
            UpdateTarget::Qualified,
        )
    }

    fn insert_all_into_target(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        statements::insert_all(self, source, destination, options, timestamp)
    }

    fn ctas_insert_all(
        &self,
        _source: &StagingTableDefinition,
        _destination: &TableDefinition,
        _target_name: &str,
        _options: &ImportOptions,
        _timestamp: &str,
    ) -> Result<String, BuilderError> {
        Err(self.no_ctas())
    }

    fn ctas_dedup(
        &self,
        _source: &StagingTableDefinition,
        _destination: &TableDefinition,
        _target_name: &str,
        _options: &ImportOptions,
        _timestamp: &str,
    ) -> Result<String, BuilderError> {
        Err(self.no_ctas())
    }
}
