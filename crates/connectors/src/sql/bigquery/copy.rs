//! BigQuery `LOAD DATA` from Cloud Storage.

use crate::{
    copy::{
        CopyAdapter, CopyError, NATIVE_COPY_CHUNK_SIZE, count_staged_rows, file_source,
        run_statement,
    },
    source::{FileSource, Source, SourceKind},
    sql::{base::connection::Connection, command_builder},
};
use async_trait::async_trait;
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::StagingTableDefinition,
};
use planner::query::ast::common::TableRef;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct BigQueryLoadAdapter;

impl BigQueryLoadAdapter {
    pub fn load_statements(
        source: &FileSource,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Vec<String> {
        let dialect = command_builder(BackendKind::BigQuery).dialect();
        let target = dialect.render_table_ref(&TableRef::of(staging.table()));
        let csv = &source.csv;

        let mut settings = vec![
            "format = 'CSV'".to_string(),
            format!(
                "field_delimiter = {}",
                dialect.quote_string(&csv.delimiter.to_string())
            ),
            format!("quote = {}", dialect.quote_string(&csv.enclosure.to_string())),
            format!("skip_leading_rows = {}", options.number_of_ignored_lines),
        ];
        if csv.compressed {
            settings.push("compression = 'GZIP'".to_string());
        }
        let settings = settings.join(", ");

        source
            .file_urls()
            .chunks(NATIVE_COPY_CHUNK_SIZE)
            .map(|chunk| {
                let uris = chunk
                    .iter()
                    .map(|u| dialect.quote_string(u))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("LOAD DATA INTO {target} FROM FILES ({settings}, uris = [{uris}])")
            })
            .collect()
    }
}

#[async_trait]
impl CopyAdapter for BigQueryLoadAdapter {
    fn name(&self) -> &'static str {
        "bigquery-load"
    }

    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool {
        backend == BackendKind::BigQuery && source.kind() == SourceKind::Gcs
    }

    async fn run_copy_command(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Result<u64, CopyError> {
        let file = file_source(self.name(), source)?;
        for sql in Self::load_statements(file, staging, options) {
            run_statement(conn, &sql).await?;
        }
        let rows = count_staged_rows(conn, staging).await?;
        info!(staging = staging.name(), files = file.files.len(), rows, "Loaded files into staging");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        source::{Credentials, CsvOptions, Storage},
        sql::base::builder::fixtures,
    };

    #[test]
    fn test_load_statement_shape() {
        let source = FileSource {
            storage: Storage::Gcs {
                bucket: "landing".into(),
            },
            files: vec!["a.csv".into(), "b.csv".into()],
            columns: vec!["id".into(), "name".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::None,
            manifest: None,
        };
        let options = ImportOptions::builder(&["id", "name"])
            .number_of_ignored_lines(1)
            .build();

        assert_eq!(
            BigQueryLoadAdapter::load_statements(&source, &fixtures::staging("ds"), &options),
            vec![concat!(
                "LOAD DATA INTO `ds`.`__temp_stage` FROM FILES (",
                "format = 'CSV', field_delimiter = ',', quote = '\"', skip_leading_rows = 1, ",
                "uris = ['gs://landing/a.csv', 'gs://landing/b.csv'])"
            )
            .to_string()]
        );
    }
}
