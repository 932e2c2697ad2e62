//! Defines common, reusable AST nodes for building SQL queries.

use model::schema::table::TableDefinition;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn of(table: &TableDefinition) -> Self {
        Self {
            schema: if table.schema.is_empty() {
                None
            } else {
                Some(table.schema.clone())
            },
            name: table.name.clone(),
        }
    }

    /// Same table name without the schema part.
    pub fn unqualified(&self) -> Self {
        Self {
            schema: None,
            name: self.name.clone(),
        }
    }
}
