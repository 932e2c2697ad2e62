use crate::query::ast::{
    common::TableRef,
    expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident, Qualifier},
};

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod macros;
pub mod renderer;

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: None,
        name: name.to_string(),
    })
}

/// `"alias"."name"`
pub fn aliased(alias: &str, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(Qualifier::Alias(alias.to_string())),
        name: name.to_string(),
    })
}

/// `"schema"."table"."name"`, for dialects that cannot alias a DML target.
pub fn table_qualified(table: &TableRef, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(Qualifier::Table(table.clone())),
        name: name.to_string(),
    })
}

pub fn string(value: &str) -> Expr {
    Expr::String(value.to_string())
}

pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall(FunctionCall {
        name: name.to_string(),
        args,
        wildcard: false,
    })
}

/// `COALESCE(expr, '')`
pub fn coalesce_empty(expr: Expr) -> Expr {
    func("COALESCE", vec![expr, string("")])
}

pub fn cast(expr: Expr, data_type: impl Into<String>) -> Expr {
    Expr::Cast {
        expr: Box::new(expr),
        data_type: data_type.into(),
    }
}

pub fn alias(expr: Expr, alias: &str) -> Expr {
    Expr::Alias {
        expr: Box::new(expr),
        alias: alias.to_string(),
    }
}

pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOperator::Eq, right)
}

pub fn not_eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOperator::NotEq, right)
}

/// Folds the expressions with `AND`. Returns `None` for an empty input.
pub fn and_all(exprs: Vec<Expr>) -> Option<Expr> {
    fold_with(exprs, BinaryOperator::And)
}

/// Folds the expressions with `OR` and wraps the chain in parentheses so it
/// can be combined with `AND` safely.
pub fn or_all(exprs: Vec<Expr>) -> Option<Expr> {
    fold_with(exprs, BinaryOperator::Or).map(|e| Expr::Nested(Box::new(e)))
}

fn fold_with(exprs: Vec<Expr>, op: BinaryOperator) -> Option<Expr> {
    let mut iter = exprs.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, expr| binary(acc, op.clone(), expr)))
}
