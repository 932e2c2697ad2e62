//! Provides fluent builders for constructing `CreateTable` and `CreateTableAs` ASTs.

use crate::query::ast::{
    common::TableRef,
    create_table::{ColumnDef, CreateTable, CreateTableAs},
    select::Select,
};
use model::{
    core::data_type::DataType,
    schema::{column::ColumnDefinition, layout::TableLayout},
};

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTable {
                table,
                ..Default::default()
            },
        }
    }

    pub fn temporary(mut self, temp: bool) -> Self {
        self.ast.temp = temp;
        self
    }

    pub fn layout(mut self, layout: TableLayout) -> Self {
        self.ast.layout = layout;
        self
    }

    /// Adds a nullable column without length or default.
    pub fn column(mut self, name: &str, data_type: DataType) -> Self {
        self.ast.columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
            length: None,
            is_nullable: true,
            default_value: None,
        });
        self
    }

    /// Adds a column copied from a table definition.
    pub fn column_def(mut self, column: &ColumnDefinition) -> Self {
        self.ast.columns.push(ColumnDef {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            length: column.length.clone(),
            is_nullable: column.nullable,
            default_value: column.default.clone(),
        });
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}

#[derive(Debug, Clone)]
pub struct CreateTableAsBuilder {
    table: TableRef,
    layout: TableLayout,
}

impl CreateTableAsBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            layout: TableLayout::default(),
        }
    }

    pub fn layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn select(self, select: Select) -> CreateTableAs {
        CreateTableAs {
            table: self.table,
            layout: self.layout,
            select,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_ref;

    #[test]
    fn test_create_table_builder() {
        let id = ColumnDefinition::new("id", DataType::Int).not_null();
        let ast = CreateTableBuilder::new(table_ref!("s", "users"))
            .column_def(&id)
            .column("name", DataType::String)
            .temporary(true)
            .layout(TableLayout::scratch())
            .build();

        assert!(ast.temp);
        assert_eq!(ast.columns.len(), 2);
        assert!(!ast.columns[0].is_nullable);
        assert!(ast.columns[1].is_nullable);
        assert_eq!(ast.layout, TableLayout::scratch());
    }
}
