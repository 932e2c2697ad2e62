//! Defines the AST for an INSERT ... SELECT statement.

use crate::query::ast::{common::TableRef, select::Select};

/// Warehouse loads only ever insert from a query, never from literal rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub select: Select,
}
