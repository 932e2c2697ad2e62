use crate::state::ImportStage;
use connectors::{
    copy::{CopyError, registry::SelectionError},
    sql::base::{
        builder::BuilderError,
        classify::{ErrorClass, RejectedRow, classify},
        error::DbError,
    },
};
use model::{
    core::backend::BackendKind,
    import::options::OptionsError,
    schema::table::TableDefinitionError,
};
use thiserror::Error;

/// Problems detected before any SQL runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Invalid import options: {0}")]
    Options(#[from] OptionsError),

    #[error("Invalid table definition: {0}")]
    Table(#[from] TableDefinitionError),

    #[error("Columns [{columns}] were not found in table {table}")]
    UnknownColumns { table: String, columns: String },

    #[error("Source does not provide columns [{columns}]")]
    MissingSourceColumns { columns: String },

    #[error("Primary key columns [{columns}] are not among the imported columns of table {table}")]
    UnknownPrimaryKeys { table: String, columns: String },

    #[error("Table {table} has no primary key")]
    MissingPrimaryKey { table: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Source not found: {message}")]
    MissingSource { message: String },

    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
        rows: Vec<RejectedRow>,
    },

    #[error("Load failed: {message}")]
    LoadFailed {
        message: String,
        stdout: String,
        stderr: String,
    },

    #[error("{context} failed: {source}")]
    Backend {
        context: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to drop table {table}: {source}")]
    Cleanup {
        table: String,
        #[source]
        source: DbError,
    },

    #[error("Copy adapter selection failed: {0}")]
    AdapterSelection(#[from] SelectionError),

    #[error("Copy failed: {0}")]
    Copy(#[source] CopyError),

    #[error("{operation} is not supported by {backend}")]
    Unsupported {
        operation: &'static str,
        backend: BackendKind,
    },

    #[error("Invalid import stage transition: {current} -> {next}")]
    InvalidStage { current: ImportStage, next: ImportStage },
}

impl ImportError {
    pub fn backend(context: impl Into<String>, source: DbError) -> Self {
        ImportError::Backend {
            context: context.into(),
            source,
        }
    }

    /// Translates a staging-population failure into an import failure kind.
    /// Driver errors are classified by the backend's message patterns.
    pub fn from_copy(backend: BackendKind, error: CopyError) -> Self {
        match error {
            CopyError::Database(e) => match classify(backend, &e) {
                ErrorClass::MissingSource => ImportError::MissingSource {
                    message: e.message(),
                },
                ErrorClass::InvalidData => ImportError::InvalidData {
                    message: e.message(),
                    rows: Vec::new(),
                },
                ErrorClass::Other => ImportError::backend("Populating staging", e),
            },
            CopyError::RejectedRows {
                message,
                rows,
                details,
            } => ImportError::InvalidData {
                message: format!("{message}\n{details}"),
                rows,
            },
            CopyError::LoadFailed {
                message,
                stdout,
                stderr,
            } => ImportError::LoadFailed {
                message,
                stdout,
                stderr,
            },
            other => ImportError::Copy(other),
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, ImportError::Precondition(_))
    }
}

impl From<BuilderError> for ImportError {
    fn from(err: BuilderError) -> Self {
        match err {
            BuilderError::UnknownColumns { table, columns } => {
                PreconditionError::UnknownColumns { table, columns }.into()
            }
            BuilderError::UnknownPrimaryKeys { table, columns } => {
                PreconditionError::UnknownPrimaryKeys { table, columns }.into()
            }
            BuilderError::MissingPrimaryKey { table } => {
                PreconditionError::MissingPrimaryKey { table }.into()
            }
            BuilderError::Unsupported { operation, backend } => {
                ImportError::Unsupported { operation, backend }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_errors_are_classified_per_backend() {
        let missing = CopyError::Database(DbError::Driver(
            "Remote file 's3://b/a.csv' was not found.".into(),
        ));
        assert!(matches!(
            ImportError::from_copy(BackendKind::Snowflake, missing),
            ImportError::MissingSource { message } if message.contains("a.csv")
        ));

        let other = CopyError::Database(DbError::Driver("permission denied".into()));
        let err = ImportError::from_copy(BackendKind::Snowflake, other);
        assert_eq!(
            err.to_string(),
            "Populating staging failed: Driver error: permission denied"
        );
    }

    #[test]
    fn test_rejected_rows_keep_details() {
        let err = ImportError::from_copy(
            BackendKind::Redshift,
            CopyError::RejectedRows {
                message: "Load failed".into(),
                rows: vec![],
                details: "line 2, column 'id': Invalid digit (value: 'x')".into(),
            },
        );
        match err {
            ImportError::InvalidData { message, .. } => {
                assert_eq!(
                    message,
                    "Load failed\nline 2, column 'id': Invalid digit (value: 'x')"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builder_errors_map_to_preconditions() {
        let err: ImportError = BuilderError::UnknownColumns {
            table: "accounts".into(),
            columns: "c1, c2".into(),
        }
        .into();
        assert!(err.is_precondition());
        assert_eq!(
            err.to_string(),
            "Precondition failed: Columns [c1, c2] were not found in table accounts"
        );

        let err: ImportError = BuilderError::Unsupported {
            operation: "CREATE TABLE AS SELECT",
            backend: BackendKind::Teradata,
        }
        .into();
        assert!(matches!(err, ImportError::Unsupported { .. }));
    }
}
