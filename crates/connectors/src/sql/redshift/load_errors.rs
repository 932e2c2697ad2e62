//! Rejected-row details for the last `COPY` of the session.

use crate::sql::base::{
    classify::RejectedRow,
    connection::{Connection, TextRow},
    error::DbError,
};

const QUERY_LOAD_ERRORS_SQL: &str = include_str!("sql/load_errors.sql");
const QUERY_LOAD_ERRORS_COUNT_SQL: &str = include_str!("sql/load_errors_count.sql");

fn cell(row: &TextRow, index: usize) -> String {
    row.get(index)
        .cloned()
        .flatten()
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub fn parse_rows(rows: &[TextRow]) -> Vec<RejectedRow> {
    rows.iter()
        .map(|row| RejectedRow {
            line: cell(row, 0).parse().ok(),
            column: cell(row, 1),
            value: cell(row, 2),
            reason: cell(row, 3),
        })
        .collect()
}

/// Returns the first rejected rows and the total number of rejections.
pub async fn fetch(conn: &dyn Connection) -> Result<(Vec<RejectedRow>, usize), DbError> {
    let rows = parse_rows(&conn.query_rows(QUERY_LOAD_ERRORS_SQL).await?);
    let total = conn.query_count(QUERY_LOAD_ERRORS_COUNT_SQL).await? as usize;
    Ok((rows, total))
}
