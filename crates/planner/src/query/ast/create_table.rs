//! Defines the AST for CREATE TABLE and CREATE TABLE ... AS SELECT.

use crate::query::ast::{common::TableRef, select::Select};
use model::{core::data_type::DataType, schema::layout::TableLayout};

/// Represents a complete CREATE TABLE statement.
#[derive(Debug, Clone, Default)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    pub temp: bool,
    pub layout: TableLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub length: Option<String>,
    pub is_nullable: bool,
    pub default_value: Option<String>,
}

/// `CREATE TABLE <table> [options] AS SELECT ...`
#[derive(Debug, Clone)]
pub struct CreateTableAs {
    pub table: TableRef,
    pub layout: TableLayout,
    pub select: Select,
}
