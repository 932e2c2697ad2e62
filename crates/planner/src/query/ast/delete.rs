//! Defines the AST for a DELETE statement.

use crate::query::ast::{common::TableRef, expr::Expr, select::FromClause};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub alias: Option<String>,
    /// `USING <table>` join source, for dialects that support it.
    pub using: Option<FromClause>,
    pub where_clause: Option<Expr>,
}
