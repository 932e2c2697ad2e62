use crate::schema::table::NameMatching;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Import column list is empty")]
    EmptyColumns,

    #[error("Duplicate import columns: {0}")]
    DuplicateColumns(String),

    #[error("Columns marked for empty-to-NULL conversion are not imported: {0}")]
    UnknownNullColumns(String),
}

/// What happens to staging strings on their way into the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastMode {
    /// Project staging values as they are and let the warehouse coerce them.
    #[default]
    Preserve,
    /// Wrap each projected value in `CAST(... AS <destination type>)`.
    CastToDestination,
}

/// Per-run behavior flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub columns: Vec<String>,
    pub incremental: bool,
    pub use_timestamp: bool,
    pub convert_empty_values_to_null: Vec<String>,
    pub number_of_ignored_lines: u32,
    pub cast_mode: CastMode,
    pub column_matching: NameMatching,
    /// Allow the CREATE TABLE AS SELECT fast path on full loads.
    pub use_ctas: bool,
}

impl ImportOptions {
    pub fn builder(columns: &[&str]) -> ImportOptionsBuilder {
        ImportOptionsBuilder::new(columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.columns.is_empty() {
            return Err(OptionsError::EmptyColumns);
        }

        let mut seen = std::collections::HashSet::new();
        let duplicates: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| !seen.insert(c.as_str()))
            .map(String::as_str)
            .collect();
        if !duplicates.is_empty() {
            return Err(OptionsError::DuplicateColumns(duplicates.join(", ")));
        }

        let unknown: Vec<&str> = self
            .convert_empty_values_to_null
            .iter()
            .filter(|c| !self.columns.iter().any(|col| self.column_matching.matches(col, c)))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(OptionsError::UnknownNullColumns(unknown.join(", ")));
        }

        Ok(())
    }

    pub fn converts_to_null(&self, column: &str) -> bool {
        self.convert_empty_values_to_null
            .iter()
            .any(|c| self.column_matching.matches(c, column))
    }

    pub fn casts_to_destination(&self) -> bool {
        self.cast_mode == CastMode::CastToDestination
    }
}

#[derive(Debug, Default)]
pub struct ImportOptionsBuilder {
    columns: Vec<String>,
    incremental: bool,
    use_timestamp: bool,
    convert_empty_values_to_null: Vec<String>,
    number_of_ignored_lines: u32,
    cast_mode: CastMode,
    column_matching: NameMatching,
    use_ctas: bool,
}

impl ImportOptionsBuilder {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn use_timestamp(mut self, use_timestamp: bool) -> Self {
        self.use_timestamp = use_timestamp;
        self
    }

    pub fn convert_empty_values_to_null(mut self, columns: &[&str]) -> Self {
        self.convert_empty_values_to_null = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn number_of_ignored_lines(mut self, lines: u32) -> Self {
        self.number_of_ignored_lines = lines;
        self
    }

    pub fn cast_mode(mut self, cast_mode: CastMode) -> Self {
        self.cast_mode = cast_mode;
        self
    }

    pub fn column_matching(mut self, matching: NameMatching) -> Self {
        self.column_matching = matching;
        self
    }

    pub fn use_ctas(mut self, use_ctas: bool) -> Self {
        self.use_ctas = use_ctas;
        self
    }

    pub fn build(self) -> ImportOptions {
        ImportOptions {
            columns: self.columns,
            incremental: self.incremental,
            use_timestamp: self.use_timestamp,
            convert_empty_values_to_null: self.convert_empty_values_to_null,
            number_of_ignored_lines: self.number_of_ignored_lines,
            cast_mode: self.cast_mode,
            column_matching: self.column_matching,
            use_ctas: self.use_ctas,
        }
    }
}
