use crate::query::ast::{common::TableRef, insert::Insert, select::Select};

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: TableRef,
    columns: Vec<String>,
}

impl InsertBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            columns: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[String]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Finalizes the statement with its source query.
    pub fn select(self, select: Select) -> Insert {
        Insert {
            table: self.table,
            columns: self.columns,
            select,
        }
    }
}
