pub mod create_table;
pub mod delete;
pub mod drop_table;
pub mod insert;
pub mod select;
pub mod update;
