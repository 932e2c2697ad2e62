use crate::{
    cleanup,
    error::ImportError,
    executor::Executor,
    state::{ImportStage, ImportState},
};
use connectors::{
    copy::{CopyAdapter, registry::CopyAdapterRegistry},
    source::Source,
    sql::base::connection::Connection,
};
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::StagingTableDefinition,
};
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

pub const COPY_TO_STAGING_TIMER: &str = "copyToStaging";

/// Fills a staging table through the single adapter that supports the
/// source on the connection's backend.
pub struct ToStageImporter {
    adapter: Arc<dyn CopyAdapter>,
}

impl ToStageImporter {
    pub fn new(adapter: Arc<dyn CopyAdapter>) -> Self {
        Self { adapter }
    }

    pub fn select(
        registry: &CopyAdapterRegistry,
        source: &Source,
        backend: BackendKind,
    ) -> Result<Self, ImportError> {
        let adapter = registry.select(source, backend)?;
        info!(adapter = adapter.name(), source_kind = %source.kind(), %backend, "Selected copy adapter");
        Ok(Self::new(adapter))
    }

    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    /// Runs the copy and returns the number of staged rows. On failure the
    /// staging table is dropped and the classified copy error is returned.
    pub async fn import(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<u64, ImportError> {
        let started = Instant::now();
        let outcome = self
            .adapter
            .run_copy_command(conn, source, staging, options)
            .await
            .map_err(|e| ImportError::from_copy(conn.backend(), e));
        state.add_timer(COPY_TO_STAGING_TIMER, started.elapsed());

        match outcome {
            Ok(rows) => {
                info!(
                    import_id = %state.import_id(),
                    staging = staging.name(),
                    adapter = self.adapter.name(),
                    rows,
                    "Staging populated"
                );
                state.transition(ImportStage::StagingPopulated)?;
                Ok(rows)
            }
            Err(e) => {
                error!(
                    import_id = %state.import_id(),
                    staging = staging.name(),
                    error = %e,
                    "Populating staging failed"
                );
                state.fail();
                let executor = Executor::new(conn);
                cleanup::finish(&executor, staging.table(), Err(e)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::{
        copy::CopyError,
        source::{SourceKind, TableSource},
        sql::base::{error::DbError, recording::RecordingConnection},
    };
    use model::schema::{column::ColumnDefinition, table::TableDefinition};

    struct FailingAdapter(&'static str);

    #[async_trait]
    impl CopyAdapter for FailingAdapter {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn is_supported(&self, _source: &Source, _backend: BackendKind) -> bool {
            true
        }

        async fn run_copy_command(
            &self,
            _conn: &dyn Connection,
            _source: &Source,
            _staging: &StagingTableDefinition,
            _options: &ImportOptions,
        ) -> Result<u64, CopyError> {
            Err(CopyError::Database(DbError::Driver(self.0.to_string())))
        }
    }

    fn source() -> Source {
        Source::Table(TableSource {
            schema: "raw".into(),
            name: "accounts".into(),
            columns: vec!["id".into()],
            primary_keys: vec![],
        })
    }

    fn staging() -> StagingTableDefinition {
        StagingTableDefinition::untyped(TableDefinition::new(
            "s",
            "__temp_stage",
            vec![ColumnDefinition::text("id")],
        ))
    }

    fn created_state() -> ImportState {
        let mut state = ImportState::new("__temp_stage");
        state.transition(ImportStage::StagingCreated).unwrap();
        state
    }

    #[tokio::test]
    async fn test_populates_with_selected_adapter() {
        let conn = RecordingConnection::new(BackendKind::Snowflake).with_affected_rows(4);
        let registry = CopyAdapterRegistry::with_defaults(None);
        let importer = ToStageImporter::select(&registry, &source(), BackendKind::Snowflake).unwrap();
        assert_eq!(importer.adapter_name(), "table-copy");

        let mut state = created_state();
        let options = ImportOptions::builder(&["id"]).build();
        let rows = importer
            .import(&conn, &source(), &staging(), &options, &mut state)
            .await
            .unwrap();

        assert_eq!(rows, 4);
        assert_eq!(state.stage(), ImportStage::StagingPopulated);
        assert_eq!(state.timers()[0].0, COPY_TO_STAGING_TIMER);
    }

    #[tokio::test]
    async fn test_missing_file_is_classified_and_staging_dropped() {
        let conn = RecordingConnection::new(BackendKind::Snowflake);
        let importer = ToStageImporter::new(Arc::new(FailingAdapter(
            "Remote file 's3://b/a.csv' was not found.",
        )));
        let mut state = created_state();
        let options = ImportOptions::builder(&["id"]).build();

        let err = importer
            .import(&conn, &source(), &staging(), &options, &mut state)
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::MissingSource { .. }));
        assert_eq!(state.stage(), ImportStage::Failed);
        assert_eq!(
            conn.statements().await,
            vec!["DROP TABLE IF EXISTS \"s\".\"__temp_stage\"".to_string()]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_tpt_load_drops_staging_once() {
        use connectors::{
            source::{Credentials, CsvOptions, FileSource, Storage},
            sql::teradata::{copy::TeradataTptAdapter, tpt::TptConfig},
        };

        let mut config = TptConfig::new("td", "u", "p");
        config.tbuild_path = "/bin/false".into();
        let importer = ToStageImporter::new(Arc::new(TeradataTptAdapter::new(config)));
        let conn = RecordingConnection::new(BackendKind::Teradata);
        let source = Source::File(FileSource {
            storage: Storage::S3 {
                bucket: "exports".into(),
                region: "us-east-1".into(),
            },
            files: vec!["a.csv".into()],
            columns: vec!["id".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::None,
            manifest: None,
        });
        let mut state = created_state();
        let options = ImportOptions::builder(&["id"]).build();

        importer
            .import(&conn, &source, &staging(), &options, &mut state)
            .await
            .unwrap_err();

        assert_eq!(state.stage(), ImportStage::Failed);
        assert_eq!(
            conn.statements().await,
            vec!["DROP TABLE \"s\".\"__temp_stage\"".to_string()]
        );
    }

    #[test]
    fn test_selection_errors() {
        let registry = CopyAdapterRegistry::new();
        let err = ToStageImporter::select(&registry, &source(), BackendKind::Exasol)
            .err()
            .unwrap();
        assert!(matches!(err, ImportError::AdapterSelection(_)));
        assert_eq!(source().kind(), SourceKind::Table);
    }
}
