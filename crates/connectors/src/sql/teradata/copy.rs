use crate::{
    copy::{CopyAdapter, CopyError, count_staged_rows, file_source},
    source::{Source, SourceKind},
    sql::{
        base::connection::Connection,
        teradata::tpt::{TptConfig, TptLoader},
    },
};
use async_trait::async_trait;
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::StagingTableDefinition,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Loads S3 files into Teradata staging through an external `tbuild` run.
#[derive(Debug, Clone)]
pub struct TeradataTptAdapter {
    loader: TptLoader,
}

impl TeradataTptAdapter {
    pub fn new(config: TptConfig) -> Self {
        Self {
            loader: TptLoader::new(config),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.loader = self.loader.with_cancellation(cancel);
        self
    }
}

#[async_trait]
impl CopyAdapter for TeradataTptAdapter {
    fn name(&self) -> &'static str {
        "teradata-tpt"
    }

    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool {
        backend == BackendKind::Teradata && source.kind() == SourceKind::S3
    }

    async fn run_copy_command(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Result<u64, CopyError> {
        let file = file_source(self.name(), source)?;
        let script = self.loader.script(file, staging, options);
        let job = TptLoader::job_name(staging);

        let outcome = match self.loader.run(&script, &job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(staging = staging.name(), error = %e, "TPT load failed");
                return Err(e);
            }
        };

        let rows = match outcome.rows_loaded {
            Some(rows) => rows,
            None => count_staged_rows(conn, staging).await?,
        };
        info!(staging = staging.name(), files = file.files.len(), rows, "TPT load finished");
        Ok(rows)
    }
}
