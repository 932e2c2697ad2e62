//! Synapse `COPY INTO` from Azure blob storage.

use crate::{
    copy::{
        CopyAdapter, CopyError, NATIVE_COPY_CHUNK_SIZE, count_staged_rows, file_source, literal,
        run_statement, staging_target,
    },
    source::{Credentials, FileSource, Source, SourceKind},
    sql::base::connection::Connection,
};
use async_trait::async_trait;
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::StagingTableDefinition,
};
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct SynapseCopyAdapter;

impl SynapseCopyAdapter {
    fn with_options(source: &FileSource, options: &ImportOptions) -> String {
        let csv = &source.csv;
        let mut with = vec!["FILE_TYPE = 'CSV'".to_string()];
        if let Credentials::AzureSas { token } = &source.credentials {
            with.push(format!(
                "CREDENTIAL = (IDENTITY = 'Shared Access Signature', SECRET = {})",
                literal(token.trim_start_matches('?'))
            ));
        }
        with.push(format!("FIELDQUOTE = {}", literal(&csv.enclosure.to_string())));
        with.push(format!("FIELDTERMINATOR = {}", literal(&csv.delimiter.to_string())));
        with.push(format!("FIRSTROW = {}", options.number_of_ignored_lines + 1));
        if csv.compressed {
            with.push("COMPRESSION = 'GZIP'".to_string());
        }
        format!("WITH ({})", with.join(", "))
    }

    pub fn copy_statements(
        source: &FileSource,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Vec<String> {
        let target = staging_target(BackendKind::Synapse, staging);
        let with = Self::with_options(source, options);
        source
            .file_urls()
            .chunks(NATIVE_COPY_CHUNK_SIZE)
            .map(|chunk| {
                let files = chunk.iter().map(|f| literal(f)).collect::<Vec<_>>();
                format!("COPY INTO {target} FROM {} {with}", files.join(", "))
            })
            .collect()
    }
}

#[async_trait]
impl CopyAdapter for SynapseCopyAdapter {
    fn name(&self) -> &'static str {
        "synapse-copy"
    }

    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool {
        backend == BackendKind::Synapse && source.kind() == SourceKind::Azure
    }

    async fn run_copy_command(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Result<u64, CopyError> {
        let file = file_source(self.name(), source)?;
        for sql in Self::copy_statements(file, staging, options) {
            run_statement(conn, &sql).await?;
        }
        let rows = count_staged_rows(conn, staging).await?;
        info!(staging = staging.name(), files = file.files.len(), rows, "Copied blobs into staging");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        source::{CsvOptions, Storage},
        sql::base::builder::fixtures,
    };

    #[test]
    fn test_copy_statement_with_sas() {
        let source = FileSource {
            storage: Storage::Azure {
                account: "acme".into(),
                container: "landing".into(),
            },
            files: vec!["a.csv".into(), "b.csv".into()],
            columns: vec!["id".into(), "name".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::AzureSas {
                token: "?sv=2020&sig=abc".into(),
            },
            manifest: None,
        };
        let options = ImportOptions::builder(&["id", "name"])
            .number_of_ignored_lines(1)
            .build();

        let statements = SynapseCopyAdapter::copy_statements(&source, &fixtures::staging("dbo"), &options);
        assert_eq!(
            statements,
            vec![concat!(
                "COPY INTO [dbo].[__temp_stage] ([id], [name]) ",
                "FROM 'https://acme.blob.core.windows.net/landing/a.csv', ",
                "'https://acme.blob.core.windows.net/landing/b.csv' ",
                "WITH (FILE_TYPE = 'CSV', ",
                "CREDENTIAL = (IDENTITY = 'Shared Access Signature', SECRET = 'sv=2020&sig=abc'), ",
                "FIELDQUOTE = '\"', FIELDTERMINATOR = ',', FIRSTROW = 2)"
            )
            .to_string()]
        );
    }

    #[test]
    fn test_only_azure_sources_are_supported() {
        let table = Source::Table(crate::source::TableSource {
            schema: "dbo".into(),
            name: "t".into(),
            columns: vec![],
            primary_keys: vec![],
        });
        assert!(!SynapseCopyAdapter.is_supported(&table, BackendKind::Synapse));
    }
}
