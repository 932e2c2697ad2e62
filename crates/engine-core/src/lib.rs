pub mod cleanup;
pub mod error;
pub mod executor;
pub mod importer;
pub mod staging;
pub mod state;
pub mod to_final;
pub mod to_stage;
