use crate::{
    cleanup,
    error::ImportError,
    executor::Executor,
    staging::{STAGING_TABLE_PREFIX, StageTableDefinitionFactory},
    state::ImportState,
    to_final::{
        CTAS_TIMER, DEDUP_TIMER, INSERT_TIMER, SWAP_TIMER, ToFinalTableImporter,
        staging_primary_keys,
    },
};
use async_trait::async_trait;
use connectors::sql::base::connection::Connection;
use model::{
    core::utils::unique_table_name,
    import::options::ImportOptions,
    schema::table::{StagingTableDefinition, TableDefinition},
};
use std::time::Instant;
use tracing::{error, info};

/// Replaces the destination's rows with the staged rows.
///
/// Without a primary key the destination is truncated and refilled inside
/// one transaction. With a primary key staging is first deduplicated into a
/// scratch table. When `use_ctas` is set and the backend supports it, the
/// destination is rebuilt with `CREATE TABLE ... AS SELECT` and swapped in.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullImporter;

impl FullImporter {
    async fn truncate_and_insert(
        executor: &Executor<'_>,
        source: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<u64, ImportError> {
        let builder = executor.builder();
        let insert = builder.insert_all_into_target(source, destination, options, state.timestamp())?;

        let started = Instant::now();
        executor.begin().await?;
        let outcome = async {
            executor.run("Truncate destination", &builder.truncate(destination)).await?;
            executor.run("Insert into destination", &insert).await
        }
        .await;
        let rows = executor.finish_transaction(outcome).await?;
        state.add_timer(INSERT_TIMER, started.elapsed());
        Ok(rows)
    }

    async fn deduplicate_and_replace(
        executor: &Executor<'_>,
        staging: &StagingTableDefinition,
        dedup: &StagingTableDefinition,
        primary_keys: &[String],
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<u64, ImportError> {
        let builder = executor.builder();
        let dedup_sql = builder.dedup(staging, dedup, primary_keys)?;
        let insert = builder.insert_all_into_target(dedup, destination, options, state.timestamp())?;

        executor.begin().await?;
        let started = Instant::now();
        let outcome = async {
            executor.run("Deduplicate staging", &dedup_sql).await?;
            let dedup_elapsed = started.elapsed();
            executor.run("Truncate destination", &builder.truncate(destination)).await?;
            let rows = executor.run("Insert into destination", &insert).await?;
            Ok::<_, ImportError>((rows, dedup_elapsed))
        }
        .await;
        let (rows, dedup_elapsed) = executor.finish_transaction(outcome).await?;
        state.add_timer(DEDUP_TIMER, dedup_elapsed);
        state.add_timer(INSERT_TIMER, started.elapsed() - dedup_elapsed);
        Ok(rows)
    }

    async fn with_dedup_table(
        executor: &Executor<'_>,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<u64, ImportError> {
        let primary_keys = staging_primary_keys(destination, options)?;
        let dedup = StageTableDefinitionFactory::new(executor.builder()).create_dedup(destination, staging);

        let create = executor.builder().create_staging(&dedup);
        executor.run("Create dedup table", &create).await?;
        let outcome = Self::deduplicate_and_replace(
            executor,
            staging,
            &dedup,
            &primary_keys,
            destination,
            options,
            state,
        )
        .await;
        cleanup::finish(executor, dedup.table(), outcome).await
    }

    async fn create_table_as_select(
        executor: &Executor<'_>,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<u64, ImportError> {
        let builder = executor.builder();
        let replacement = destination.renamed(&unique_table_name(STAGING_TABLE_PREFIX));
        let sql = if destination.has_primary_keys() {
            builder.ctas_dedup(staging, destination, &replacement.name, options, state.timestamp())?
        } else {
            builder.ctas_insert_all(staging, destination, &replacement.name, options, state.timestamp())?
        };

        let started = Instant::now();
        executor.run("Create table as select", &sql).await?;
        state.add_timer(CTAS_TIMER, started.elapsed());

        let started = Instant::now();
        Self::swap(executor, destination, &replacement).await?;
        state.add_timer(SWAP_TIMER, started.elapsed());

        executor.count("Count destination rows", destination).await
    }

    /// Drops the destination and renames `replacement` into its place.
    /// Where DDL is transactional both run in one transaction and a failure
    /// discards the replacement. Elsewhere a failed rename leaves the rows in
    /// `replacement`, which is kept and reported.
    async fn swap(
        executor: &Executor<'_>,
        destination: &TableDefinition,
        replacement: &TableDefinition,
    ) -> Result<(), ImportError> {
        let builder = executor.builder();
        let drop = builder.drop_table(destination);
        let rename = builder.rename(replacement, &destination.name);

        if builder.capabilities().transactional_ddl {
            let outcome = match executor.begin().await {
                Ok(()) => {
                    let outcome = async {
                        executor.run("Drop destination", &drop).await?;
                        executor.run("Rename replacement", &rename).await
                    }
                    .await;
                    executor.finish_transaction(outcome).await
                }
                Err(e) => Err(e),
            };
            return match outcome {
                Ok(_) => Ok(()),
                Err(e) => cleanup::finish(executor, replacement, Err(e)).await,
            };
        }

        if let Err(e) = executor.run("Drop destination", &drop).await {
            return cleanup::finish(executor, replacement, Err(e)).await;
        }
        if let Err(e) = executor.run("Rename replacement", &rename).await {
            error!(
                destination = %destination.name,
                replacement = %replacement.name,
                error = %e,
                "Destination was dropped but the replacement could not be renamed"
            );
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl ToFinalTableImporter for FullImporter {
    async fn import_to_table(
        &self,
        conn: &dyn Connection,
        staging: &StagingTableDefinition,
        destination: &TableDefinition,
        options: &ImportOptions,
        state: &mut ImportState,
    ) -> Result<(), ImportError> {
        let executor = Executor::new(conn);
        let use_ctas = options.use_ctas && executor.builder().capabilities().ctas;

        let rows = if use_ctas {
            Self::create_table_as_select(&executor, staging, destination, options, state).await?
        } else if destination.has_primary_keys() {
            Self::with_dedup_table(&executor, staging, destination, options, state).await?
        } else {
            Self::truncate_and_insert(&executor, staging, destination, options, state).await?
        };

        state.set_imported_rows_count(rows);
        state.set_imported_columns(options.columns.clone());
        info!(
            import_id = %state.import_id(),
            destination = %destination.name,
            rows,
            ctas = use_ctas,
            "Full load merged"
        );
        Ok(())
    }
}
