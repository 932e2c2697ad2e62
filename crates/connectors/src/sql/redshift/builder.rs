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
pub struct RedshiftCommandBuilder;

impl SqlCommandBuilder for RedshiftCommandBuilder {
    fn backend(&self) -> BackendKind {
        BackendKind::Redshift
    }

    fn create_staging(&self, staging: &StagingTableDefinition) -> String {
        statements::create_table(self, staging.table(), staging.is_temporary())
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
        statements::delete_old_items(self, staging, destination, options, DeleteStyle::Using)
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
            UpdateTarget::Qualified,
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

    const B: RedshiftCommandBuilder = RedshiftCommandBuilder;

    fn session_staging() -> StagingTableDefinition {
        StagingTableDefinition::untyped(fixtures::staging("").table().clone().temporary())
    }

    #[test]
    fn test_create_session_staging_without_schema() {
        assert_eq!(
            B.create_staging(&session_staging()),
            "CREATE TEMPORARY TABLE \"__temp_stage\" (\"id\" VARCHAR(65535), \"name\" VARCHAR(65535))"
        );
    }

    #[test]
    fn test_update_from_session_staging() {
        let sql = B
            .update_with_pk(
                &session_staging(),
                &fixtures::destination("public"),
                &fixtures::options(),
                TS,
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "UPDATE \"public\".\"accounts\" SET \"name\" = NULLIF(\"src\".\"name\", '') ",
                "FROM \"__temp_stage\" AS \"src\" ",
                "WHERE \"public\".\"accounts\".\"id\" = COALESCE(\"src\".\"id\", '') ",
                "AND (COALESCE(CAST(\"public\".\"accounts\".\"name\" AS VARCHAR(65535)), '') <> COALESCE(\"src\".\"name\", ''))"
            )
        );
    }

    #[test]
    fn test_delete_old_items_using() {
        let sql = B
            .delete_old_items(
                &session_staging(),
                &fixtures::destination("public"),
                &fixtures::options(),
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "DELETE FROM \"__temp_stage\" USING \"public\".\"accounts\" ",
                "WHERE \"public\".\"accounts\".\"id\" = COALESCE(\"__temp_stage\".\"id\", '')"
            )
        );
    }

    #[test]
    fn test_delete_requires_primary_key() {
        let mut destination = fixtures::destination("public");
        destination.primary_keys.clear();
        let err = B
            .delete_old_items(&session_staging(), &destination, &fixtures::options())
            .unwrap_err();
        assert_eq!(
            err,
            BuilderError::MissingPrimaryKey {
                table: "accounts".into()
            }
        );
    }

    #[test]
    fn test_insert_into_dedup_scratch() {
        let sql = B
            .insert_all_into_target(
                &fixtures::dedup("public"),
                &fixtures::destination("public"),
                &fixtures::options_with_timestamp(),
                TS,
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO \"public\".\"accounts\" (\"id\", \"name\", \"_timestamp\") ",
                "SELECT COALESCE(\"id\", ''), NULLIF(\"name\", ''), '2024-05-01 10:00:00' ",
                "FROM \"public\".\"__temp_dedup\""
            )
        );
    }

    #[test]
    fn test_rename_and_transactions() {
        assert_eq!(
            B.rename(&fixtures::destination("public"), "accounts_tmp"),
            "ALTER TABLE \"public\".\"accounts\" RENAME TO \"accounts_tmp\""
        );
        assert_eq!(B.begin_transaction(), "BEGIN TRANSACTION");
        assert_eq!(B.commit_transaction(), "COMMIT");
    }
}
