use crate::sql::base::{
    builder::{BuilderError, SqlCommandBuilder},
    statements::{self, DeleteStyle, UpdateTarget},
};
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::{
        layout::{Distribution, TableLayout},
        table::{StagingTableDefinition, TableDefinition},
    },
};
use std::borrow::Cow;

#[derive(Debug, Default, Clone, Copy)]
pub struct SynapseCommandBuilder;

impl SynapseCommandBuilder {
    /// CTAS on a dedicated pool needs an explicit distribution.
    fn with_distribution(destination: &TableDefinition) -> Cow<'_, TableDefinition> {
        if destination.layout.distribution.is_some() {
            return Cow::Borrowed(destination);
        }
        let mut layout = destination.layout.clone();
        layout.distribution = Some(Distribution::RoundRobin);
        Cow::Owned(destination.clone().with_layout(layout))
    }
}

impl SqlCommandBuilder for SynapseCommandBuilder {
    fn backend(&self) -> BackendKind {
        BackendKind::Synapse
    }

    fn staging_layout(&self) -> TableLayout {
        TableLayout::scratch()
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
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        target_name: &str,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        let destination = Self::with_distribution(destination);
        statements::ctas(self, source, &destination, target_name, options, timestamp, false)
    }

    fn ctas_dedup(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        target_name: &str,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        let destination = Self::with_distribution(destination);
        statements::ctas(self, source, &destination, target_name, options, timestamp, true)
    }
}
