pub mod adapter;
pub mod copy;
pub mod error;
pub mod source;
pub mod sql;
