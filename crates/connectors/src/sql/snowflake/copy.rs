//! `COPY INTO` from an external stage location.

use crate::{
    copy::{
        CopyAdapter, CopyError, NATIVE_COPY_CHUNK_SIZE, count_staged_rows, file_source, literal,
        relative_keys, run_statement, staging_target,
    },
    source::{Credentials, CsvOptions, FileSource, Source, Storage},
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
pub struct SnowflakeCopyAdapter;

impl SnowflakeCopyAdapter {
    fn location(storage: &Storage) -> String {
        match storage {
            Storage::S3 { bucket, .. } => format!("s3://{bucket}/"),
            Storage::Azure { account, container } => {
                format!("azure://{account}.blob.core.windows.net/{container}/")
            }
            Storage::Gcs { bucket } => format!("gcs://{bucket}/"),
        }
    }

    fn credentials(source: &FileSource) -> Option<String> {
        match &source.credentials {
            Credentials::AwsKeys {
                key_id,
                secret_key,
                session_token,
            } => {
                let mut parts = vec![
                    format!("AWS_KEY_ID = {}", literal(key_id)),
                    format!("AWS_SECRET_KEY = {}", literal(secret_key)),
                ];
                if let Some(token) = session_token {
                    parts.push(format!("AWS_TOKEN = {}", literal(token)));
                }
                Some(format!("CREDENTIALS = ({})", parts.join(" ")))
            }
            Credentials::AzureSas { token } => {
                Some(format!("CREDENTIALS = (AZURE_SAS_TOKEN = {})", literal(token)))
            }
            Credentials::IamRole { .. } | Credentials::None => None,
        }
    }

    fn file_format(csv: &CsvOptions, options: &ImportOptions) -> String {
        let mut format = vec![
            "TYPE = CSV".to_string(),
            format!("FIELD_DELIMITER = {}", literal(&csv.delimiter.to_string())),
            format!(
                "FIELD_OPTIONALLY_ENCLOSED_BY = {}",
                literal(&csv.enclosure.to_string())
            ),
            format!("SKIP_HEADER = {}", options.number_of_ignored_lines),
        ];
        match csv.escaped_by {
            Some(escape) => format.push(format!("ESCAPE = {}", literal(&escape.to_string()))),
            None => format.push("ESCAPE_UNENCLOSED_FIELD = NONE".to_string()),
        }
        if csv.compressed {
            format.push("COMPRESSION = GZIP".to_string());
        }
        format!("FILE_FORMAT = ({})", format.join(" "))
    }

    pub fn copy_statements(
        source: &FileSource,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Vec<String> {
        let mut head = vec![
            format!("COPY INTO {}", staging_target(BackendKind::Snowflake, staging)),
            format!("FROM {}", literal(&Self::location(&source.storage))),
        ];
        head.extend(Self::credentials(source));
        if let Storage::S3 { region, .. } = &source.storage {
            head.push(format!("REGION = {}", literal(region)));
        }
        head.push(Self::file_format(&source.csv, options));
        let head = head.join(" ");

        relative_keys(&source.files)
            .chunks(NATIVE_COPY_CHUNK_SIZE)
            .map(|chunk| {
                let files = chunk.iter().map(|f| literal(f)).collect::<Vec<_>>();
                format!("{head} FILES = ({})", files.join(", "))
            })
            .collect()
    }
}

#[async_trait]
impl CopyAdapter for SnowflakeCopyAdapter {
    fn name(&self) -> &'static str {
        "snowflake-copy"
    }

    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool {
        backend == BackendKind::Snowflake && matches!(source, Source::File(_))
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
        info!(staging = staging.name(), files = file.files.len(), rows, "Copied files into staging");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::{builder::fixtures, recording::RecordingConnection};

    fn source(files: usize) -> FileSource {
        FileSource {
            storage: Storage::S3 {
                bucket: "exports".into(),
                region: "us-east-1".into(),
            },
            files: (0..files).map(|i| format!("/sliced/part-{i}.csv")).collect(),
            columns: vec!["id".into(), "name".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::AwsKeys {
                key_id: "AKIA".into(),
                secret_key: "secret".into(),
                session_token: None,
            },
            manifest: None,
        }
    }

    #[test]
    fn test_copy_statement_shape() {
        let options = ImportOptions::builder(&["id", "name"])
            .number_of_ignored_lines(1)
            .build();
        let statements =
            SnowflakeCopyAdapter::copy_statements(&source(2), &fixtures::staging("PUBLIC"), &options);
        assert_eq!(
            statements,
            vec![concat!(
                "COPY INTO \"PUBLIC\".\"__temp_stage\" (\"id\", \"name\") FROM 's3://exports/' ",
                "CREDENTIALS = (AWS_KEY_ID = 'AKIA' AWS_SECRET_KEY = 'secret') REGION = 'us-east-1' ",
                "FILE_FORMAT = (TYPE = CSV FIELD_DELIMITER = ',' FIELD_OPTIONALLY_ENCLOSED_BY = '\"' ",
                "SKIP_HEADER = 1 ESCAPE_UNENCLOSED_FIELD = NONE) ",
                "FILES = ('sliced/part-0.csv', 'sliced/part-1.csv')"
            )
            .to_string()]
        );
    }

    #[test]
    fn test_files_are_chunked() {
        let statements = SnowflakeCopyAdapter::copy_statements(
            &source(NATIVE_COPY_CHUNK_SIZE + 1),
            &fixtures::staging("PUBLIC"),
            &ImportOptions::builder(&["id", "name"]).build(),
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[1].ends_with(&format!("FILES = ('sliced/part-{NATIVE_COPY_CHUNK_SIZE}.csv')")));
    }

    #[tokio::test]
    async fn test_run_copy_counts_staged_rows() {
        let conn = RecordingConnection::new(BackendKind::Snowflake).with_count(42);
        let rows = SnowflakeCopyAdapter
            .run_copy_command(
                &conn,
                &Source::File(source(1)),
                &fixtures::staging("PUBLIC"),
                &ImportOptions::builder(&["id", "name"]).build(),
            )
            .await
            .unwrap();
        assert_eq!(rows, 42);

        let statements = conn.statements().await;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], "SELECT COUNT(*) FROM \"PUBLIC\".\"__temp_stage\"");
    }
}
