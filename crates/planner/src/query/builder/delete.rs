use crate::query::ast::{common::TableRef, delete::Delete, expr::Expr, select::FromClause};

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    ast: Delete,
}

impl DeleteBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Delete {
                table,
                alias: None,
                using: None,
                where_clause: None,
            },
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.ast.alias = Some(alias.to_string());
        self
    }

    pub fn using(mut self, table: TableRef, alias: Option<&str>) -> Self {
        self.ast.using = Some(FromClause::table(table, alias));
        self
    }

    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    pub fn build(self) -> Delete {
        self.ast
    }
}
