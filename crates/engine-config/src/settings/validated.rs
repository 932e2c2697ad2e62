use connectors::{source::Source, sql::teradata::tpt::TptConfig};
use model::{
    core::backend::BackendKind, import::options::ImportOptions, schema::table::TableDefinition,
};

/// Immutable, validated configuration for one import.
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    /// Target warehouse
    pub backend: BackendKind,
    /// Connection string, absent for dry runs
    pub connection_url: Option<String>,
    /// Where the rows come from
    pub source: Source,
    /// Table the rows end up in
    pub destination: TableDefinition,
    /// Resolved import options, columns included
    pub options: ImportOptions,
    /// Parallel Transporter settings, Teradata only
    pub loader: Option<TptConfig>,
    /// Whether staging columns carry destination types
    pub typed_staging: bool,
    /// Fixed `_timestamp` literal
    pub timestamp: Option<String>,
}

impl ValidatedSettings {
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn connection_url(&self) -> Option<&str> {
        self.connection_url.as_deref()
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn destination(&self) -> &TableDefinition {
        &self.destination
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn loader(&self) -> Option<&TptConfig> {
        self.loader.as_ref()
    }

    pub fn typed_staging(&self) -> bool {
        self.typed_staging
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn is_incremental(&self) -> bool {
        self.options.incremental
    }
}
