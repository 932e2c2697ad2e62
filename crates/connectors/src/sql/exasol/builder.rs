use crate::sql::base::{
    builder::{BuilderError, SqlCommandBuilder},
    statements::{self, DeleteStyle, UpdateTarget},
};
use model::{
    core::backend::BackendKind,
    import::options::ImportOptions,
    schema::table::{StagingTableDefinition, TableDefinition},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct ExasolCommandBuilder;

impl SqlCommandBuilder for ExasolCommandBuilder {
    fn backend(&self) -> BackendKind {
        BackendKind::Exasol
    }

    fn create_staging(&self, staging: &StagingTableDefinition) -> String {
        statements::create_table(self, staging.table(), false)
    }

    fn dedup(
        &self,
        source: &StagingTableDefinition,
        dedup: &StagingTableDefinition,
        primary_keys: &[String],
    ) -> Result<String, BuilderError> {
        statements::dedup(self, source, dedup, primary_keys)
    }

    fn delete_old_items(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
    ) -> Result<String, BuilderError> {
        statements::delete_old_items(self, staging, destination, options, DeleteStyle::ExistsAliased)
    }

    fn update_with_pk(
        &self,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        statements::update_with_pk(
            self,
            staging,
            destination,
            options,
            timestamp,
            UpdateTarget::AliasedJoined,
        )
    }

    fn insert_all_into_target(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        statements::insert_all(self, source, destination, options, timestamp)
    }

    fn ctas_insert_all(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        target_name: &str,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        statements::ctas(self, source, destination, target_name, options, timestamp, false)
    }

    fn ctas_dedup(
        &self,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        target_name: &str,
        options: &ImportOptions,
        timestamp: &str,
    ) -> Result<String, BuilderError> {
        statements::ctas(self, source, destination, target_name, options, timestamp, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::base::builder::fixtures::{self, TS};
    use model::import::options::CastMode;

    const B: ExasolCommandBuilder = ExasolCommandBuilder;

    #[test]
    fn test_create_staging_is_permanent() {
        assert_eq!(
            B.create_staging(&fixtures::staging("in_c")),
            "CREATE TABLE \"in_c\".\"__temp_stage\" (\"id\" VARCHAR(2000000), \"name\" VARCHAR(2000000))"
        );
    }

    #[test]
    fn test_update_joins_target_by_alias() {
        let sql = B
            .update_with_pk(
                &fixtures::staging("in_c"),
                &fixtures::destination("in_c"),
                &fixtures::options(),
                TS,
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "UPDATE \"in_c\".\"accounts\" AS \"dest\" ",
                "SET \"name\" = NULLIF(\"src\".\"name\", '') ",
                "FROM \"in_c\".\"accounts\" AS \"dest\", \"in_c\".\"__temp_stage\" AS \"src\" ",
                "WHERE \"dest\".\"id\" = COALESCE(\"src\".\"id\", '') ",
                "AND (COALESCE(CAST(\"dest\".\"name\" AS VARCHAR(2000000)), '') <> COALESCE(\"src\".\"name\", ''))"
            )
        );
    }

    #[test]
    fn test_delete_old_items_aliased_exists() {
        let sql = B
            .delete_old_items(
                &fixtures::staging("in_c"),
                &fixtures::destination("in_c"),
                &fixtures::options(),
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "DELETE FROM \"in_c\".\"__temp_stage\" AS \"src\" WHERE EXISTS (",
                "SELECT * FROM \"in_c\".\"accounts\" AS \"dest\" ",
                "WHERE \"dest\".\"id\" = COALESCE(\"src\".\"id\", ''))"
            )
        );
    }

    #[test]
    fn test_cast_mode_insert() {
        let options = ImportOptions::builder(&["id", "name"])
            .cast_mode(CastMode::CastToDestination)
            .build();
        let sql = B
            .insert_all_into_target(
                &fixtures::staging("in_c"),
                &fixtures::destination("in_c"),
                &options,
                TS,
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO \"in_c\".\"accounts\" (\"id\", \"name\") ",
                "SELECT CAST(NULLIF(\"id\", '') AS INTEGER), CAST(COALESCE(\"name\", '') AS VARCHAR(255)) ",
                "FROM \"in_c\".\"__temp_stage\""
            )
        );
    }

    #[test]
    fn test_transaction_statements() {
        assert_eq!(B.begin_transaction(), "");
        assert_eq!(B.commit_transaction(), "COMMIT");
        assert_eq!(
            B.rename(&fixtures::destination("in_c"), "accounts_old"),
            "RENAME TABLE \"in_c\".\"accounts\" TO \"in_c\".\"accounts_old\""
        );
    }
}
