//! Defines the Abstract Syntax Tree (AST) for a SELECT query.

use crate::query::ast::{common::TableRef, expr::Expr};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// The list of columns or expressions to be returned.
    pub columns: Vec<Expr>,

    /// The table or subquery the rows come from.
    pub from: Option<FromClause>,

    /// The WHERE clause condition.
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub source: FromSource,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Table(TableRef),
    Subquery(Box<Select>),
}

impl FromClause {
    pub fn table(table: TableRef, alias: Option<&str>) -> Self {
        Self {
            source: FromSource::Table(table),
            alias: alias.map(String::from),
        }
    }
}
