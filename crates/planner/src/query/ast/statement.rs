//! Small structural statements that carry no sub-expressions.

use crate::query::ast::common::TableRef;

#[derive(Debug, Clone)]
pub struct TruncateTable {
    pub table: TableRef,
}

#[derive(Debug, Clone)]
pub struct RenameTable {
    pub table: TableRef,
    pub new_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionControl {
    Begin,
    Commit,
    Rollback,
}
