//! Defines the AST for SQL expressions.

use crate::query::ast::{common::TableRef, select::Select};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column identifier, optionally qualified, e.g. `"src"."id"`.
    Identifier(Ident),

    /// A string literal, quoted by the dialect.
    String(String),

    /// Raw SQL emitted verbatim, e.g. `NULL` or `*`.
    Literal(String),

    /// A binary operation, e.g. `a = b` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g. `COALESCE(a, '')`.
    FunctionCall(FunctionCall),

    /// `CAST(expr AS type)`
    Cast { expr: Box<Expr>, data_type: String },

    /// An aliased expression, e.g. `COUNT(*) AS total_count`
    Alias { expr: Box<Expr>, alias: String },

    /// `ROW_NUMBER() OVER (PARTITION BY ... ORDER BY ...)`
    RowNumber {
        partition_by: Vec<Expr>,
        order_by: Vec<Expr>,
    },

    /// `EXISTS (SELECT ...)`
    Exists(Box<Select>),

    /// A parenthesized expression.
    Nested(Box<Expr>),
}

/// What a column reference is qualified with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    Alias(String),
    Table(TableRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<Qualifier>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    And,
    Or,
}
