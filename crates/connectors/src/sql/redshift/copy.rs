//! Redshift `COPY` from S3, with rejected rows read back from
//! `stl_load_errors` when the load fails on bad data.

use crate::{
    copy::{
        CopyAdapter, CopyError, count_staged_rows, file_source, literal, run_statement,
        staging_target,
    },
    source::{Credentials, FileSource, Source, SourceKind, Storage},
    sql::{
        base::{
            classify::{ErrorClass, format_rejected_rows},
            connection::Connection,
            error::DbError,
        },
        redshift::{classify::PATTERNS, load_errors},
    },
};
use async_trait::async_trait;
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::StagingTableDefinition,
};
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct RedshiftCopyAdapter;

impl RedshiftCopyAdapter {
    fn authorization(source: &FileSource) -> Option<String> {
        match &source.credentials {
            Credentials::AwsKeys {
                key_id,
                secret_key,
                session_token,
            } => {
                let mut credentials =
                    format!("aws_access_key_id={key_id};aws_secret_access_key={secret_key}");
                if let Some(token) = session_token {
                    credentials.push_str(&format!(";token={token}"));
                }
                Some(format!("CREDENTIALS {}", literal(&credentials)))
            }
            Credentials::IamRole { arn } => Some(format!("IAM_ROLE {}", literal(arn))),
            Credentials::AzureSas { .. } | Credentials::None => None,
        }
    }

    /// One statement per file, or a single `MANIFEST` load when the source
    /// names a manifest object.
    pub fn copy_statements(
        source: &FileSource,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> Vec<String> {
        let target = staging_target(BackendKind::Redshift, staging);
        let csv = &source.csv;

        let mut tail = Vec::new();
        tail.extend(Self::authorization(source));
        if let Storage::S3 { region, .. } = &source.storage {
            tail.push(format!("REGION {}", literal(region)));
        }
        tail.push(format!("DELIMITER {}", literal(&csv.delimiter.to_string())));
        tail.push(format!("CSV QUOTE {}", literal(&csv.enclosure.to_string())));
        if options.number_of_ignored_lines > 0 {
            tail.push(format!("IGNOREHEADER {}", options.number_of_ignored_lines));
        }
        if csv.compressed {
            tail.push("GZIP".to_string());
        }
        let tail = tail.join(" ");

        match &source.manifest {
            Some(manifest) => vec![format!(
                "COPY {target} FROM {} MANIFEST {tail}",
                literal(&source.storage.url(manifest))
            )],
            None => source
                .file_urls()
                .iter()
                .map(|url| format!("COPY {target} FROM {} {tail}", literal(url)))
                .collect(),
        }
    }

    /// Turns a bad-data failure into `RejectedRows`; anything else, or a
    /// failure to read the details, keeps the driver error.
    async fn explain(conn: &dyn Connection, error: DbError) -> CopyError {
        let message = error.message();
        if PATTERNS.classify(&message) != ErrorClass::InvalidData {
            return CopyError::Database(error);
        }

        match load_errors::fetch(conn).await {
            Ok((rows, total)) if !rows.is_empty() => CopyError::RejectedRows {
                details: format_rejected_rows(&rows, total),
                message,
                rows,
            },
            Ok(_) => CopyError::Database(error),
            Err(e) => {
                warn!(error = %e, "Failed to read stl_load_errors");
                CopyError::Database(error)
            }
        }
    }
}

#[async_trait]
impl CopyAdapter for RedshiftCopyAdapter {
    fn name(&self) -> &'static str {
        "redshift-copy"
    }

    fn is_supported(&self, source: &Source, backend: BackendKind) -> bool {
        backend == BackendKind::Redshift && source.kind() == SourceKind::S3
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
            if let Err(e) = run_statement(conn, &sql).await {
                return Err(Self::explain(conn, e).await);
            }
        }
        let rows = count_staged_rows(conn, staging).await?;
        info!(staging = staging.name(), files = file.files.len(), rows, "Copied files into staging");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        source::CsvOptions,
        sql::base::{builder::fixtures, recording::RecordingConnection},
    };

    fn source(manifest: Option<&str>) -> FileSource {
        FileSource {
            storage: Storage::S3 {
                bucket: "exports".into(),
                region: "us-east-1".into(),
            },
            files: vec!["part-0.csv".into(), "part-1.csv".into()],
            columns: vec!["id".into(), "name".into()],
            primary_keys: vec![],
            csv: CsvOptions {
                compressed: true,
                ..CsvOptions::default()
            },
            credentials: Credentials::IamRole {
                arn: "arn:aws:iam::1:role/loader".into(),
            },
            manifest: manifest.map(str::to_string),
        }
    }

    #[test]
    fn test_copy_per_file() {
        let options = ImportOptions::builder(&["id", "name"])
            .number_of_ignored_lines(1)
            .build();
        let statements = RedshiftCopyAdapter::copy_statements(&source(None), &fixtures::staging(""), &options);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            concat!(
                "COPY \"__temp_stage\" (\"id\", \"name\") FROM 's3://exports/part-0.csv' ",
                "IAM_ROLE 'arn:aws:iam::1:role/loader' REGION 'us-east-1' ",
                "DELIMITER ',' CSV QUOTE '\"' IGNOREHEADER 1 GZIP"
            )
        );
    }

    #[test]
    fn test_copy_with_manifest() {
        let statements = RedshiftCopyAdapter::copy_statements(
            &source(Some("manifests/run.json")),
            &fixtures::staging(""),
            &ImportOptions::builder(&["id", "name"]).build(),
        );
        assert_eq!(statements.len(), 1);
        assert!(statements[0].contains("FROM 's3://exports/manifests/run.json' MANIFEST IAM_ROLE"));
    }

    #[tokio::test]
    async fn test_bad_data_reads_load_errors() {
        let conn = RecordingConnection::new(BackendKind::Redshift).fail_on(
            "COPY",
            "Load into table '__temp_stage' failed. Check 'stl_load_errors' system table for details.",
        );
        let err = RedshiftCopyAdapter
            .run_copy_command(
                &conn,
                &Source::File(source(None)),
                &fixtures::staging(""),
                &ImportOptions::builder(&["id", "name"]).build(),
            )
            .await
            .unwrap_err();

        // The recording connection answers every query with one single-cell
        // row, which parses as a rejection with an unknown column.
        match err {
            CopyError::RejectedRows { message, rows, .. } => {
                assert!(message.starts_with("Load into table"));
                assert_eq!(rows.len(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let statements = conn.statements().await;
        assert!(statements[1].contains("stl_load_errors"));
    }

    #[tokio::test]
    async fn test_other_failures_keep_driver_error() {
        let conn = RecordingConnection::new(BackendKind::Redshift)
            .fail_on("COPY", "permission denied for relation accounts");
        let err = RedshiftCopyAdapter
            .run_copy_command(
                &conn,
                &Source::File(source(None)),
                &fixtures::staging(""),
                &ImportOptions::builder(&["id", "name"]).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CopyError::Database(_)));
        assert_eq!(conn.statements().await.len(), 1);
    }
}
