//! Maps warehouse driver errors onto import failure kinds.
//!
//! Drivers do not expose structured codes for these cases, so each dialect
//! matches fragments of the driver text. The pattern tables live next to
//! each dialect; this module only dispatches.

use crate::sql::{
    base::error::DbError, bigquery, exasol, redshift, snowflake, synapse, teradata,
};
use model::core::backend::BackendKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// An input file or manifest entry does not exist.
    MissingSource,
    /// The bulk load rejected rows.
    InvalidData,
    Other,
}

/// Fragments that identify each failure kind in a driver message.
pub struct ErrorPatterns {
    pub missing_source: &'static [&'static str],
    pub invalid_data: &'static [&'static str],
}

impl ErrorPatterns {
    pub fn classify(&self, message: &str) -> ErrorClass {
        if self.missing_source.iter().any(|p| message.contains(p)) {
            ErrorClass::MissingSource
        } else if self.invalid_data.iter().any(|p| message.contains(p)) {
            ErrorClass::InvalidData
        } else {
            ErrorClass::Other
        }
    }
}

pub fn classify(kind: BackendKind, error: &DbError) -> ErrorClass {
    let patterns = match kind {
        BackendKind::Snowflake => &snowflake::classify::PATTERNS,
        BackendKind::Synapse => &synapse::classify::PATTERNS,
        BackendKind::Exasol => &exasol::classify::PATTERNS,
        BackendKind::Teradata => &teradata::classify::PATTERNS,
        BackendKind::BigQuery => &bigquery::classify::PATTERNS,
        BackendKind::Redshift => &redshift::classify::PATTERNS,
    };
    patterns.classify(&error.message())
}

/// One row rejected by a bulk load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: Option<u64>,
    pub column: String,
    pub value: String,
    pub reason: String,
}

pub const MAX_DISPLAYED_REJECTIONS: usize = 10;

/// Aggregates rejected rows into one multi-line message. At most
/// `MAX_DISPLAYED_REJECTIONS` rows are listed; `total` above that adds a
/// summary line.
pub fn format_rejected_rows(rows: &[RejectedRow], total: usize) -> String {
    let mut lines: Vec<String> = rows
        .iter()
        .take(MAX_DISPLAYED_REJECTIONS)
        .map(|row| {
            let line = row
                .line
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!(
                "line {line}, column '{}': {} (value: '{}')",
                row.column.trim(),
                row.reason.trim(),
                row.value.trim()
            )
        })
        .collect();

    let total = total.max(rows.len());
    if total > MAX_DISPLAYED_REJECTIONS {
        lines.push(format!(
            "... too many errors, {} more not shown",
            total - MAX_DISPLAYED_REJECTIONS
        ));
    }
    lines.join("\n")
}
