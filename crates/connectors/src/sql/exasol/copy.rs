//! Exasol `IMPORT ... FROM CSV AT` over the S3 HTTPS endpoint.

use crate::{
    copy::{
        CopyAdapter, CopyError, EXTERNAL_READER_CHUNK_SIZE, count_staged_rows, file_source,
        literal, relative_keys, run_statement, staging_target, unsupported,
    },
    source::{Credentials, FileSource, Source, SourceKind, Storage},
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
pub struct ExasolImportAdapter;

impl ExasolImportAdapter {
    fn endpoint(storage: &Storage) -> Option<String> {
        match storage {
            Storage::S3 { bucket, region } => {
                Some(format!("https://{bucket}.s3.{region}.amazonaws.com"))
            }
            _ => None,
        }
    }

    pub fn import_statements(
        source: &FileSource,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Vec<String> {
        let Some(endpoint) = Self::endpoint(&source.storage) else {
            return Vec::new();
        };

        let mut at = format!("AT {}", literal(&endpoint));
        if let Credentials::AwsKeys {
            key_id, secret_key, ..
        } = &source.credentials
        {
            at.push_str(&format!(
                " USER {} IDENTIFIED BY {}",
                literal(key_id),
                literal(secret_key)
            ));
        }

        let csv = &source.csv;
        let mut tail = vec![
            format!("COLUMN SEPARATOR = {}", literal(&csv.delimiter.to_string())),
            format!("COLUMN DELIMITER = {}", literal(&csv.enclosure.to_string())),
        ];
        if options.number_of_ignored_lines > 0 {
            tail.push(format!("SKIP = {}", options.number_of_ignored_lines));
        }
        let tail = tail.join(" ");
        let target = staging_target(BackendKind::Exasol, staging);

        relative_keys(&source.files)
            .chunks(EXTERNAL_READER_CHUNK_SIZE)
            .map(|chunk| {
                let files = chunk
                    .iter()
                    .map(|f| format!("FILE {}", literal(f)))
                    .collect::<Vec<_>>();
                format!(
                    "IMPORT INTO {target} FROM CSV {at} {} {tail}",
                    files.join(" ")
                )
            })
            .collect()
    }
}

#[async_trait]
impl CopyAdapter for ExasolImportAdapter {
    fn name(&self) -> &'static str {
        "exasol-import"
    }

    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool {
        backend == BackendKind::Exasol && source.kind() == SourceKind::S3
    }

    async fn run_copy_command(
        &self,
        conn: &dyn Connection,
        source: &Source,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Result<u64, CopyError> {
        let file = file_source(self.name(), source)?;
        let statements = Self::import_statements(file, staging, options);
        if statements.is_empty() && !file.files.is_empty() {
            return Err(unsupported(self.name(), source));
        }
        for sql in statements {
            run_statement(conn, &sql).await?;
        }
        let rows = count_staged_rows(conn, staging).await?;
        info!(staging = staging.name(), files = file.files.len(), rows, "Imported files into staging");
        Ok(rows)
    }
}
