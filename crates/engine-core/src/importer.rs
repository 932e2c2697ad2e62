//! The `import_table` entry point: staging, merge, cleanup.

use crate::{
    cleanup,
    error::{ImportError, PreconditionError},
    executor::Executor,
    staging::StageTableDefinitionFactory,
    state::{ImportResult, ImportStage, ImportState},
    to_final,
    to_stage::ToStageImporter,
};
use connectors::{
    copy::registry::CopyAdapterRegistry,
    source::Source,
    sql::base::connection::Connection,
};
use model::{
    import::options::ImportOptions,
    schema::table::{StagingTableDefinition, TableDefinition},
};
use std::sync::Arc;
use tracing::{error, info};

/// Loads a source into a destination table over one connection.
pub struct TableImporter {
    conn: Arc<dyn Connection>,
    registry: CopyAdapterRegistry,
    typed_staging: bool,
    timestamp: Option<String>,
}

impl TableImporter {
    pub fn new(conn: Arc<dyn Connection>, registry: CopyAdapterRegistry) -> Self {
        Self {
            conn,
            registry,
            typed_staging: false,
            timestamp: None,
        }
    }

    /// Stage into columns typed like the destination instead of text.
    pub fn with_typed_staging(mut self, typed: bool) -> Self {
        self.typed_staging = typed;
        self
    }

    /// Fixes the `_timestamp` literal instead of using the current time.
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    /// Checks that an import can start. Nothing is executed.
    pub fn validate(
        &self,
        source: &Source,
        destination: &TableDefinition,
        options: &ImportOptions,
    ) -> Result<(), PreconditionError> {
        options.validate()?;
        destination.validate()?;

        let missing = destination.missing_columns(&options.columns, options.column_matching);
        if !missing.is_empty() {
            return Err(PreconditionError::UnknownColumns {
                table: destination.name.clone(),
                columns: missing.join(", "),
            });
        }

        let provided = source.column_names();
        let unknown: Vec<&str> = options
            .columns
            .iter()
            .filter(|c| !provided.iter().any(|p| options.column_matching.matches(p, c)))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(PreconditionError::MissingSourceColumns {
                columns: unknown.join(", "),
            });
        }
        Ok(())
    }

    /// Runs one import. The staging table is dropped on every path that
    /// created it.
    pub async fn import_table(
        &self,
        source: &Source,
        destination: &TableDefinition,
        options: &ImportOptions,
    ) -> Result<ImportResult, ImportError> {
        self.validate(source, destination, options)?;

        let conn = self.conn.as_ref();
        let executor = Executor::new(conn);
        let to_stage = ToStageImporter::select(&self.registry, source, conn.backend())?;
        let staging = self.staging_definition(&executor, destination, options)?;

        let mut state = ImportState::new(staging.name());
        if let Some(timestamp) = &self.timestamp {
            state = state.with_timestamp(timestamp);
        }
        info!(
            import_id = %state.import_id(),
            backend = %conn.backend(),
            destination = %destination.name,
            staging = staging.name(),
            incremental = options.incremental,
            "Starting import"
        );

        let create = executor.builder().create_staging(&staging);
        if let Err(e) = executor.run("Create staging table", &create).await {
            state.fail();
            return Err(e);
        }
        state.transition(ImportStage::StagingCreated)?;

        to_stage
            .import(conn, source, &staging, options, &mut state)
            .await?;

        let outcome = self.merge(&staging, destination, options, &mut state).await;
        let outcome = cleanup::finish(&executor, staging.table(), outcome).await;
        if let Err(e) = outcome {
            error!(import_id = %state.import_id(), error = %e, "Import failed");
            state.fail();
            return Err(e);
        }

        state.transition(ImportStage::Cleaned)?;
        state.transition(ImportStage::Done)?;
        info!(
            import_id = %state.import_id(),
            rows = state.imported_rows_count(),
            "Import finished"
        );
        Ok(state.into_result())
    }

    async fn merge(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<(), ImportError> {
        state.transition(ImportStage::Merging)?;
        to_final::for_options(options)
            .import_to_table(self.conn.as_ref(), staging, destination, options, state)
            .await
    }

    fn staging_definition(
        &self,
        executor: &Executor<'_>,
        destination: &TableDefinition,
        options: &ImportOptions,
    ) -> Result<StagingTableDefinition, PreconditionError> {
        let factory = StageTableDefinitionFactory::new(executor.builder());
        if self.typed_staging {
            factory.create_staging_with_types(destination, &options.columns, options.column_matching)
        } else {
            Ok(factory.create_staging(destination, &options.columns))
        }
    }
}
