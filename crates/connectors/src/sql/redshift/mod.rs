pub mod builder;
pub mod classify;
pub mod connection;
pub mod copy;
pub mod load_errors;
pub(crate) mod utils;
