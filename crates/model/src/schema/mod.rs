pub mod column;
pub mod layout;
pub mod table;
