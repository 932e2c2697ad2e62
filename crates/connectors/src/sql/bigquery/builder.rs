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
pub struct BigQueryCommandBuilder;

impl SqlCommandBuilder for BigQueryCommandBuilder {
    fn backend(&self) -> BackendKind {
        BackendKind::BigQuery
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
            UpdateTarget::Aliased,
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

    const B: BigQueryCommandBuilder = BigQueryCommandBuilder;

    #[test]
    fn test_create_staging() {
        assert_eq!(
            B.create_staging(&fixtures::staging("landing")),
            "CREATE TABLE `landing`.`__temp_stage` (`id` STRING, `name` STRING)"
        );
    }

    #[test]
    fn test_update_with_aliased_target() {
        let sql = B
            .update_with_pk(
                &fixtures::staging("landing"),
                &fixtures::destination("landing"),
                &fixtures::options(),
                TS,
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "UPDATE `landing`.`accounts` AS `dest` ",
                "SET `name` = NULLIF(`src`.`name`, '') ",
                "FROM `landing`.`__temp_stage` AS `src` ",
                "WHERE `dest`.`id` = COALESCE(`src`.`id`, '') ",
                "AND (COALESCE(CAST(`dest`.`name` AS STRING), '') <> COALESCE(`src`.`name`, ''))"
            )
        );
    }

    #[test]
    fn test_delete_old_items() {
        let sql = B
            .delete_old_items(
                &fixtures::staging("landing"),
                &fixtures::destination("landing"),
                &fixtures::options(),
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "DELETE `landing`.`__temp_stage` AS `src` WHERE EXISTS (",
                "SELECT * FROM `landing`.`accounts` AS `dest` ",
                "WHERE `dest`.`id` = COALESCE(`src`.`id`, ''))"
            )
        );
    }

    #[test]
    fn test_ctas_with_timestamp() {
        let sql = B
            .ctas_insert_all(
                &fixtures::staging("landing"),
                &fixtures::destination("landing"),
                "accounts_new",
                &fixtures::options_with_timestamp(),
                TS,
            )
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "CREATE TABLE `landing`.`accounts_new` AS SELECT ",
                "CAST(NULLIF(`id`, '') AS INT64) AS `id`, ",
                "CAST(NULLIF(`name`, '') AS STRING) AS `name`, ",
                "CAST('2024-05-01 10:00:00' AS DATETIME) AS `_timestamp` ",
                "FROM `landing`.`__temp_stage`"
            )
        );
    }

    #[test]
    fn test_typed_staging_skips_defaults_for_non_strings() {
        let staging = StagingTableDefinition::typed(fixtures::destination("landing").renamed("__temp_typed"));
        let options = ImportOptions::builder(&["id", "name"]).build();
        let sql = B
            .insert_all_into_target(&staging, &fixtures::destination("landing"), &options, TS)
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO `landing`.`accounts` (`id`, `name`) ",
                "SELECT `id`, COALESCE(`name`, '') FROM `landing`.`__temp_typed`"
            )
        );
    }

    #[test]
    fn test_transactions() {
        assert_eq!(B.begin_transaction(), "BEGIN TRANSACTION");
        assert_eq!(B.commit_transaction(), "COMMIT TRANSACTION");
    }
}
