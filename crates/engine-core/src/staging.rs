use crate::error::PreconditionError;
use connectors::sql::base::builder::SqlCommandBuilder;
use model::{
    core::utils::unique_table_name,
    schema::{
        column::ColumnDefinition,
        table::{NameMatching, StagingTableDefinition, TableDefinition},
    },
};

pub const STAGING_TABLE_PREFIX: &str = "__temp_";

/// Synthesizes staging and dedup tables for one destination.
///
/// Names are unique per call so concurrent imports into one destination
/// never share scratch tables. Backends with session temp tables get
/// temporary staging; Redshift's live outside any schema.
pub struct StageTableDefinitionFactory<'a> {
    builder: &'a dyn SqlCommandBuilder,
}

impl<'a> StageTableDefinitionFactory<'a> {
    pub fn new(builder: &'a dyn SqlCommandBuilder) -> Self {
        Self { builder }
    }

    /// All-text staging for `columns`.
    pub fn create_staging(
        &self,
        destination: &TableDefinition,
        columns: &[String],
    ) -> StagingTableDefinition {
        let columns = columns.iter().map(|c| ColumnDefinition::text(c)).collect();
        StagingTableDefinition::untyped(self.scratch_table(destination, columns))
    }

    /// Staging whose columns carry the destination's types.
    pub fn create_staging_with_types(
        &self,
        destination: &TableDefinition,
        columns: &[String],
        matching: NameMatching,
    ) -> Result<StagingTableDefinition, PreconditionError> {
        let missing = destination.missing_columns(columns, matching);
        if !missing.is_empty() {
            return Err(PreconditionError::UnknownColumns {
                table: destination.name.clone(),
                columns: missing.join(", "),
            });
        }

        let columns = columns
            .iter()
            .filter_map(|name| {
                destination.column(name, matching).map(|c| ColumnDefinition {
                    name: name.clone(),
                    nullable: true,
                    default: None,
                    ..c.clone()
                })
            })
            .collect();
        Ok(StagingTableDefinition::typed(
            self.scratch_table(destination, columns),
        ))
    }

    /// Scratch table for deduplicated staging rows. Same columns as
    /// `staging`, laid out like the destination.
    pub fn create_dedup(
        &self,
        destination: &TableDefinition,
        staging: &StagingTableDefinition,
    ) -> StagingTableDefinition {
        let mut table = self.scratch_table(destination, staging.table().columns.clone());
        if !table.temporary {
            table.layout = destination.layout.clone();
        }
        if staging.is_typed() {
            StagingTableDefinition::typed(table)
        } else {
            StagingTableDefinition::untyped(table)
        }
    }

    fn scratch_table(
        &self,
        destination: &TableDefinition,
        columns: Vec<ColumnDefinition>,
    ) -> TableDefinition {
        let capabilities = self.builder.capabilities();
        let schema = if capabilities.temp_tables && capabilities.schemaless_temp_tables {
            ""
        } else {
            destination.schema.as_str()
        };

        let table = TableDefinition::new(
            schema,
            &unique_table_name(STAGING_TABLE_PREFIX),
            columns,
        )
        .with_layout(self.builder.staging_layout());

        if capabilities.temp_tables {
            table.temporary()
        } else {
            table
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::sql::command_builder;
    use model::{
        core::{backend::BackendKind, data_type::DataType},
        schema::layout::{Distribution, TableIndex, TableLayout},
    };

    fn destination() -> TableDefinition {
        TableDefinition::new(
            "sales",
            "orders",
            vec![
                ColumnDefinition::new("id", DataType::Int).not_null(),
                ColumnDefinition::new("amount", DataType::Decimal).with_length("10,2"),
            ],
        )
        .with_primary_keys(&["id"])
        .with_layout(TableLayout::new(
            Some(Distribution::Hash(vec!["id".into()])),
            Some(TableIndex::ClusteredColumnstore),
        ))
    }

    fn columns() -> Vec<String> {
        vec!["id".to_string(), "amount".to_string()]
    }

    #[test]
    fn test_staging_names_are_unique() {
        let factory = StageTableDefinitionFactory::new(command_builder(BackendKind::Exasol));
        let a = factory.create_staging(&destination(), &columns());
        let b = factory.create_staging(&destination(), &columns());
        assert!(a.name().starts_with(STAGING_TABLE_PREFIX));
        assert_ne!(a.name(), b.name());
        assert_eq!(a.schema(), "sales");
        assert!(!a.is_temporary());
        assert!(!a.is_typed());
    }

    #[test]
    fn test_temp_staging_per_backend() {
        let snowflake = StageTableDefinitionFactory::new(command_builder(BackendKind::Snowflake));
        let staging = snowflake.create_staging(&destination(), &columns());
        assert!(staging.is_temporary());
        assert_eq!(staging.schema(), "sales");

        let redshift = StageTableDefinitionFactory::new(command_builder(BackendKind::Redshift));
        let staging = redshift.create_staging(&destination(), &columns());
        assert!(staging.is_temporary());
        assert_eq!(staging.schema(), "");
    }

    #[test]
    fn test_typed_staging_mirrors_destination_types() {
        let factory = StageTableDefinitionFactory::new(command_builder(BackendKind::Synapse));
        let staging = factory
            .create_staging_with_types(&destination(), &columns(), NameMatching::Strict)
            .unwrap();
        assert!(staging.is_typed());
        let id = &staging.table().columns[0];
        assert_eq!(id.data_type, DataType::Int);
        assert!(id.nullable);
        assert_eq!(staging.table().columns[1].length.as_deref(), Some("10,2"));
        assert_eq!(staging.table().layout, TableLayout::scratch());
    }

    #[test]
    fn test_typed_staging_rejects_unknown_columns() {
        let factory = StageTableDefinitionFactory::new(command_builder(BackendKind::Snowflake));
        let err = factory
            .create_staging_with_types(
                &destination(),
                &["c1".to_string(), "id".to_string(), "c2".to_string()],
                NameMatching::Strict,
            )
            .unwrap_err();
        assert_eq!(
            err,
            PreconditionError::UnknownColumns {
                table: "orders".into(),
                columns: "c1, c2".into()
            }
        );
    }

    #[test]
    fn test_dedup_inherits_destination_layout() {
        let factory = StageTableDefinitionFactory::new(command_builder(BackendKind::Synapse));
        let staging = factory.create_staging(&destination(), &columns());
        let dedup = factory.create_dedup(&destination(), &staging);
        assert_ne!(dedup.name(), staging.name());
        assert_eq!(dedup.column_names(), staging.column_names());
        assert_eq!(dedup.table().layout, destination().layout);
    }
}
