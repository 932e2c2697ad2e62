//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// --- Typestate Marker Structs ---
// These zero-sized structs represent the state of the builder.
// They ensure that methods are called in the correct SQL order at compile time.

use crate::query::ast::{
    common::TableRef,
    expr::Expr,
    select::{FromClause, FromSource, Select},
};

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

// --- The Main Builder ---

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    #[allow(dead_code)]
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implementation for the initial state of the builder.
impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    /// Adds a `SELECT` clause with a list of columns.
    /// This is the entry point for building a select query.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

/// Implementation for the state after `SELECT` has been called.
/// The only valid next step is to specify a source.
impl SelectBuilder<SelectState> {
    /// Adds a `FROM` clause specifying a table.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause::table(table, alias));
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }

    /// Adds a `FROM (subquery) AS alias` clause.
    pub fn from_subquery(mut self, select: Select, alias: &str) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            source: FromSource::Subquery(Box::new(select)),
            alias: Some(alias.to_string()),
        });
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

/// Implementation for the state after `FROM` has been called.
impl SelectBuilder<FromState> {
    /// Adds a `WHERE` clause to the query.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// Adds a `WHERE` clause when a condition is present.
    pub fn where_opt(mut self, condition: Option<Expr>) -> Self {
        self.ast.where_clause = condition;
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }
}
