use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escapes a value for use inside a single-quoted SQL string literal.
pub fn escape_string_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Renders the literal timestamp stamped into `_timestamp` columns.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Builds a collision-resistant table name: `<prefix><32 hex chars>`.
pub fn unique_table_name(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}
