//! Exactly-one adapter selection keyed by (source kind, backend).

use crate::{
    copy::{CopyAdapter, table::TableCopyAdapter},
    source::{Source, SourceKind},
    sql::{
        bigquery::copy::BigQueryLoadAdapter, exasol::copy::ExasolImportAdapter,
        redshift::copy::RedshiftCopyAdapter, snowflake::copy::SnowflakeCopyAdapter,
        synapse::copy::SynapseCopyAdapter, teradata::copy::TeradataTptAdapter,
    },
};
use model::core::backend::BackendKind;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No copy adapter supports loading {source_kind} into {backend}")]
    NoAdapter {
        source_kind: SourceKind,
        backend: BackendKind,
    },

    #[error("More than one copy adapter supports loading {source_kind} into {backend}: {adapters}")]
    AmbiguousAdapter {
        source_kind: SourceKind,
        backend: BackendKind,
        adapters: String,
    },
}

#[derive(Default, Clone)]
pub struct CopyAdapterRegistry {
    adapters: HashMap<(SourceKind, BackendKind), Vec<Arc<dyn CopyAdapter>>>,
}

impl CopyAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled adapters: native file copy per warehouse,
    /// the Teradata TPT loader, and table-to-table copy everywhere.
    pub fn with_defaults(tpt: Option<TeradataTptAdapter>) -> Self {
        let mut registry = Self::new();

        let snowflake = Arc::new(SnowflakeCopyAdapter);
        for kind in [SourceKind::S3, SourceKind::Azure, SourceKind::Gcs] {
            registry.register(kind, BackendKind::Snowflake, snowflake.clone());
        }
        registry.register(SourceKind::Azure, BackendKind::Synapse, Arc::new(SynapseCopyAdapter));
        registry.register(SourceKind::S3, BackendKind::Exasol, Arc::new(ExasolImportAdapter));
        registry.register(SourceKind::Gcs, BackendKind::BigQuery, Arc::new(BigQueryLoadAdapter));
        registry.register(SourceKind::S3, BackendKind::Redshift, Arc::new(RedshiftCopyAdapter));
        if let Some(tpt) = tpt {
            registry.register(SourceKind::S3, BackendKind::Teradata, Arc::new(tpt));
        }

        let table = Arc::new(TableCopyAdapter);
        for backend in BackendKind::ALL {
            registry.register(SourceKind::Table, backend, table.clone());
        }
        registry
    }

    pub fn register(
        &mut self,
        source_kind: SourceKind,
        backend: BackendKind,
        adapter: Arc<dyn CopyAdapter>,
    ) {
        self.adapters
            .entry((source_kind, backend))
            .or_default()
            .push(adapter);
    }

    /// Picks the single adapter that supports `source` on `backend`.
    pub fn select(
        &self,
        source: &Source,
        backend: BackendKind,
    ) -> Result<Arc<dyn CopyAdapter>, SelectionError> {
        let source_kind = source.kind();
        let mut supported: Vec<&Arc<dyn CopyAdapter>> = self
            .adapters
            .get(&(source_kind, backend))
            .map(|candidates| {
                candidates
                    .iter()
                    .filter(|a| a.is_supported(source, backend))
                    .collect()
            })
            .unwrap_or_default();

        match supported.len() {
            0 => Err(SelectionError::NoAdapter {
                source_kind,
                backend,
            }),
            1 => Ok(supported.remove(0).clone()),
            _ => Err(SelectionError::AmbiguousAdapter {
                source_kind,
                backend,
                adapters: supported
                    .iter()
                    .map(|a| a.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CsvOptions, Credentials, FileSource, Storage, TableSource};

    fn s3_source() -> Source {
        Source::File(FileSource {
            storage: Storage::S3 {
                bucket: "b".into(),
                region: "us-east-1".into(),
            },
            files: vec!["a.csv".into()],
            columns: vec!["id".into()],
            primary_keys: vec![],
            csv: CsvOptions::default(),
            credentials: Credentials::None,
            manifest: None,
        })
    }

    fn table_source() -> Source {
        Source::Table(TableSource {
            schema: "s".into(),
            name: "t".into(),
            columns: vec!["id".into()],
            primary_keys: vec![],
        })
    }

    #[test]
    fn test_defaults_select_native_adapters() {
        let registry = CopyAdapterRegistry::with_defaults(None);
        let adapter = registry.select(&s3_source(), BackendKind::Redshift).unwrap();
        assert_eq!(adapter.name(), "redshift-copy");
        let adapter = registry.select(&table_source(), BackendKind::Teradata).unwrap();
        assert_eq!(adapter.name(), "table-copy");
    }

    #[test]
    fn test_no_adapter() {
        let registry = CopyAdapterRegistry::with_defaults(None);
        let err = registry
            .select(&s3_source(), BackendKind::Synapse)
            .err()
            .unwrap();
        assert_eq!(
            err,
            SelectionError::NoAdapter {
                source_kind: SourceKind::S3,
                backend: BackendKind::Synapse
            }
        );
    }

    #[test]
    fn test_ambiguous_adapter() {
        let mut registry = CopyAdapterRegistry::with_defaults(None);
        registry.register(
            SourceKind::Table,
            BackendKind::Exasol,
            Arc::new(TableCopyAdapter),
        );
        let err = registry
            .select(&table_source(), BackendKind::Exasol)
            .err()
            .unwrap();
        assert!(matches!(err, SelectionError::AmbiguousAdapter { adapters, .. } if adapters == "table-copy, table-copy"));
    }
}
