use crate::query::ast::{
    common::TableRef,
    expr::Expr,
    select::FromClause,
    update::{Assignment, Update},
};

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    ast: Update,
}

impl UpdateBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Update {
                table,
                alias: None,
                assignments: Vec::new(),
                from: Vec::new(),
                where_clause: None,
            },
        }
    }

    pub fn set(mut self, column: &str, value: Expr) -> Self {
        self.ast.assignments.push(Assignment {
            column: column.to_string(),
            value,
        });
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.ast.alias = Some(alias.to_string());
        self
    }

    /// Adds a source to the `FROM` list.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> Self {
        self.ast.from.push(FromClause::table(table, alias));
        self
    }

    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    pub fn build(self) -> Update {
        self.ast
    }
}
