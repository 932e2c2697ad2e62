use crate::{
    cleanup,
    error::ImportError,
    executor::Executor,
    staging::StageTableDefinitionFactory,
    state::ImportState,
    to_final::{
        DEDUP_TIMER, DELETE_TIMER, INSERT_TIMER, ToFinalTableImporter, UPDATE_TIMER,
        staging_primary_keys,
    },
};
use async_trait::async_trait;
use connectors::sql::base::connection::Connection;
use model::{
    import::options::ImportOptions,
    schema::table::{StagingTableDefinition, TableDefinition},
};
use std::time::{Duration, Instant};
use tracing::info;

/// Merges staged rows into the destination.
///
/// Without a primary key rows are appended. With one, changed rows are
/// updated in place, their staging copies deleted, and the remainder
/// deduplicated and inserted, all in one transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncrementalImporter;

/// Statements of one upsert, built before anything runs.
struct MergePlan {
    update: String,
    delete: String,
    dedup: String,
    insert: String,
}

impl IncrementalImporter {
    async fn append(
        executor: &Executor<'_>,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<(), ImportError> {
        let insert = executor.builder().insert_all_into_target(
            staging,
            destination,
            options,
            state.timestamp(),
        )?;
        let started = Instant::now();
        let rows = executor.run("Insert into destination", &insert).await?;
        state.add_timer(INSERT_TIMER, started.elapsed());
        state.add_imported_rows(rows);
        Ok(())
    }

    async fn upsert(
        executor: &Executor<'_>,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<(), ImportError> {
        let builder = executor.builder();
        let primary_keys = staging_primary_keys(destination, options)?;
        let dedup = StageTableDefinitionFactory::new(builder).create_dedup(destination, staging);
        let plan = MergePlan {
            update: builder.update_with_pk(staging, destination, options, state.timestamp())?,
            delete: builder.delete_old_items(staging, destination, options)?,
            dedup: builder.dedup(staging, &dedup, &primary_keys)?,
            insert: builder.insert_all_into_target(&dedup, destination, options, state.timestamp())?,
        };

        executor
            .run("Create dedup table", &builder.create_staging(&dedup))
            .await?;
        let outcome = Self::merge(executor, &plan, state).await;
        cleanup::finish(executor, dedup.table(), outcome).await
    }

    /// Update, delete, dedup and insert, strictly in that order. Updated and
    /// inserted rows are counted once the transaction commits.
    async fn merge(
        executor: &Executor<'_>,
        plan: &MergePlan,
        state: &mut ImportState,
    ) -> Result<(), ImportError> {
        executor.begin().await?;
        let mut timers: Vec<(&str, Duration)> = Vec::with_capacity(4);
        let outcome = async {
            let started = Instant::now();
            let updated = executor.run("Update destination", &plan.update).await?;
            timers.push((UPDATE_TIMER, started.elapsed()));

            let started = Instant::now();
            executor.run("Delete updated rows from staging", &plan.delete).await?;
            timers.push((DELETE_TIMER, started.elapsed()));

            let started = Instant::now();
            executor.run("Deduplicate staging", &plan.dedup).await?;
            timers.push((DEDUP_TIMER, started.elapsed()));

            let started = Instant::now();
            let inserted = executor.run("Insert into destination", &plan.insert).await?;
            timers.push((INSERT_TIMER, started.elapsed()));

            info!(updated, inserted, "Merged staging into destination");
            Ok::<_, ImportError>((updated, inserted))
        }
        .await;
        let (updated, inserted) = executor.finish_transaction(outcome).await?;

        for (name, elapsed) in timers {
            state.add_timer(name, elapsed);
        }
        state.add_imported_rows(updated);
        state.add_imported_rows(inserted);
        Ok(())
    }
}

#[async_trait]
impl ToFinalTableImporter for IncrementalImporter {
    async fn import_to_table(
        &self,
        conn: &dyn Connection,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<(), ImportError> {
        let executor = Executor::new(conn);
        if destination.has_primary_keys() {
            Self::upsert(&executor, staging, destination, options, state).await?;
        } else {
            Self::append(&executor, staging, destination, options, state).await?;
        }

        let rows = state.imported_rows_count();
        state.set_imported_columns(options.columns.clone());
        info!(
            import_id = %state.import_id(),
            destination = %destination.name,
            rows,
            "Incremental load merged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::PreconditionError,
        to_final::fixtures::{self, TS, verbs},
    };
    use model::core::backend::BackendKind;

    fn state() -> ImportState {
        ImportState::new("__temp_stage").with_timestamp(TS)
    }

    #[tokio::test]
    async fn test_append_without_pk() {
        let conn = fixtures::conn(BackendKind::Redshift);
        let mut state = state();
        IncrementalImporter
            .import_to_table(
                &conn,
                &fixtures::staging(),
                &fixtures::destination(false),
                &fixtures::options(true),
                &mut state,
            )
            .await
            .unwrap();

        assert_eq!(verbs(&conn.statements().await), vec!["INSERT INTO"]);
        assert_eq!(state.imported_rows_count(), 2);
    }

    #[tokio::test]
    async fn test_upsert_order_and_transaction_boundaries() {
        let conn = fixtures::conn(BackendKind::Snowflake);
        let mut state = state();
        IncrementalImporter
            .import_to_table(
                &conn,
                &fixtures::staging(),
                &fixtures::destination(true),
                &fixtures::options(true),
                &mut state,
            )
            .await
            .unwrap();

        let statements = conn.statements().await;
        assert_eq!(
            verbs(&statements),
            vec![
                "CREATE TEMPORARY",
                "BEGIN TRANSACTION",
                "UPDATE \"s\".\"accounts\"",
                "DELETE FROM",
                "INSERT INTO",
                "INSERT INTO",
                "COMMIT",
                "DROP TABLE",
            ]
        );
        assert!(statements[3].contains("USING \"s\".\"accounts\""));
        assert!(statements[4].contains("ROW_NUMBER()"));
        assert!(statements[5].starts_with("INSERT INTO \"s\".\"accounts\""));
        // Two affected rows from the update plus two from the insert.
        assert_eq!(state.imported_rows_count(), 4);
        assert_eq!(
            state.timers().iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            vec![UPDATE_TIMER, DELETE_TIMER, DEDUP_TIMER, INSERT_TIMER]
        );
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_and_drops_dedup_table() {
        let conn = fixtures::conn(BackendKind::Synapse).fail_on("UPDATE", "deadlock victim");
        let mut state = state();
        let err = IncrementalImporter
            .import_to_table(
                &conn,
                &fixtures::staging(),
                &fixtures::destination(true),
                &fixtures::options(true),
                &mut state,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Backend { context, .. } if context == "Update destination"));
        assert_eq!(
            verbs(&conn.statements().await),
            vec![
                "CREATE TABLE",
                "BEGIN TRANSACTION",
                "UPDATE [s].[accounts]",
                "ROLLBACK",
                "IF OBJECT_ID",
            ]
        );
        assert!(state.timers().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_primary_key_fails_before_any_statement() {
        let conn = fixtures::conn(BackendKind::Snowflake);
        let mut state = state();
        let options = ImportOptions::builder(&["name"]).incremental(true).build();
        let err = IncrementalImporter
            .import_to_table(
                &conn,
                &fixtures::staging(),
                &fixtures::destination(true),
                &options,
                &mut state,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ImportError::Precondition(PreconditionError::UnknownPrimaryKeys { .. })
        ));
        assert!(conn.statements().await.is_empty());
    }
}
