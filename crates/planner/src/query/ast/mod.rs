pub mod common;
pub mod create_table;
pub mod delete;
pub mod drop_table;
pub mod expr;
pub mod insert;
pub mod select;
pub mod statement;
pub mod update;
