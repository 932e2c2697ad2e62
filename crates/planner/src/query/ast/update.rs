//! Defines the AST for an UPDATE ... FROM statement.

use crate::query::ast::{common::TableRef, expr::Expr, select::FromClause};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableRef,
    pub alias: Option<String>,
    pub assignments: Vec<Assignment>,
    /// Joined sources, rendered as a comma-separated list.
    pub from: Vec<FromClause>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}
