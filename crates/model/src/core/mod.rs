pub mod backend;
pub mod data_type;
pub mod identifiers;
pub mod utils;
