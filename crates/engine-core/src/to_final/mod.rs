//! Merging a populated staging table into its destination.

use crate::{
    error::{ImportError, PreconditionError},
    state::ImportState,
};
use async_trait::async_trait;
use connectors::sql::base::connection::Connection;
use model::{
    import::options::ImportOptions,
    schema::table::{StagingTableDefinition, TableDefinition},
};

pub mod full;
pub mod incremental;

pub use full::FullImporter;
pub use incremental::IncrementalImporter;

pub const DEDUP_TIMER: &str = "dedup";
pub const INSERT_TIMER: &str = "insertIntoTargetFromStaging";
pub const UPDATE_TIMER: &str = "updateTargetTable";
pub const DELETE_TIMER: &str = "deleteUpdatedRowsFromStaging";
pub const CTAS_TIMER: &str = "createTableAsSelect";
pub const SWAP_TIMER: &str = "swapTables";

/// Moves staged rows into the destination table.
///
/// Implementations own any scratch tables they create and drop them before
/// returning. The staging table itself belongs to the caller.
#[async_trait]
pub trait ToFinalTableImporter: Send + Sync {
    async fn import_to_table(
        &self,
        conn: &dyn Connection,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<(), ImportError>;
}

/// Picks the merge strategy for `options`.
pub fn for_options(options: &ImportOptions) -> Box<dyn ToFinalTableImporter> {
    if options.incremental {
        Box::new(IncrementalImporter)
    } else {
        Box::new(FullImporter)
    }
}

/// Staging names of the destination's primary keys, in key order.
pub(crate) fn staging_primary_keys(
    destination: &TableDefinition,
    options: &ImportOptions,
) -> Result<Vec<String>, PreconditionError> {
    let mut found = Vec::with_capacity(destination.primary_keys.len());
    let mut missing = Vec::new();
    for pk in &destination.primary_keys {
        match options
            .columns
            .iter()
            .find(|c| options.column_matching.matches(c, pk))
        {
            Some(column) => found.push(column.clone()),
            None => missing.push(pk.as_str()),
        }
    }

    if !missing.is_empty() {
        return Err(PreconditionError::UnknownPrimaryKeys {
            table: destination.name.clone(),
            columns: missing.join(", "),
        });
    }
    Ok(found)
}


#[cfg(test)]
mod tests {
    use super::*;
    use model::schema::table::NameMatching;

    #[test]
    fn test_staging_primary_keys_follow_matching() {
        let destination = fixtures::destination(true);
        let options = ImportOptions::builder(&["ID", "name"])
            .column_matching(NameMatching::CaseInsensitive)
            .build();
        assert_eq!(
            staging_primary_keys(&destination, &options).unwrap(),
            vec!["ID".to_string()]
        );

        let options = ImportOptions::builder(&["name"]).build();
        let err = staging_primary_keys(&destination, &options).unwrap_err();
        assert!(matches!(err, PreconditionError::UnknownPrimaryKeys { columns, .. } if columns == "id"));
    }
}
