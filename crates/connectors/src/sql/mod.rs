use crate::sql::base::builder::SqlCommandBuilder;
use model::core::backend::BackendKind;

pub mod base;
pub mod bigquery;
pub mod exasol;
pub mod redshift;
pub mod snowflake;
pub mod synapse;
pub mod teradata;

/// Returns the command builder for a backend.
pub fn command_builder(kind: BackendKind) -> &'static dyn SqlCommandBuilder {
    match kind {
        BackendKind::Snowflake => &snowflake::builder::SnowflakeCommandBuilder,
        BackendKind::Synapse => &synapse::builder::SynapseCommandBuilder,
        BackendKind::Exasol => &exasol::builder::ExasolCommandBuilder,
        BackendKind::Teradata => &teradata::builder::TeradataCommandBuilder,
        BackendKind::BigQuery => &bigquery::builder::BigQueryCommandBuilder,
        BackendKind::Redshift => &redshift::builder::RedshiftCommandBuilder,
    }
}
