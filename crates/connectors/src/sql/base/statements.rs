//! Statement shapes the dialect builders compose.
//!
//! Each function renders one statement for the builder it is handed; the
//! style enums select between the join forms the warehouses accept.

use crate::sql::base::{
    builder::{BuilderError, SqlCommandBuilder},
    projection::{
        ColumnPair, DEDUP_ALIAS, DESTINATION_ALIAS, Projection, ROW_NUMBER_COLUMN, SOURCE_ALIAS,
        import_columns, pair_columns, primary_key_pairs, timestamp_column,
    },
};
use model::{
    import::options::ImportOptions,
    schema::table::{NameMatching, StagingTableDefinition, TableDefinition},
};
use planner::query::{
    alias, aliased, and_all,
    ast::{common::TableRef, expr::Expr, select::Select},
    builder::{
        create_table::{CreateTableAsBuilder, CreateTableBuilder},
        delete::DeleteBuilder,
        insert::InsertBuilder,
        select::SelectBuilder,
        update::UpdateBuilder,
    },
    cast, eq, ident, or_all,
    renderer::to_sql,
    table_qualified,
};

/// How destination columns are referenced in an `UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    /// `"schema"."dest"."col"`
    Qualified,
    /// `UPDATE dest AS "dest"`, columns as `"dest"."col"`.
    Aliased,
    /// Aliased, and the target repeated in the `FROM` list.
    AliasedJoined,
}

/// How staging rows that already exist in the destination are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStyle {
    /// `DELETE FROM stg USING dest WHERE ...`
    Using,
    /// `DELETE stg WHERE EXISTS (SELECT * FROM dest WHERE ...)`
    Exists,
    /// `EXISTS` form with `"src"`/`"dest"` aliases.
    ExistsAliased,
}

fn projection<'a>(
    builder: &'a dyn SqlCommandBuilder,
    options: &'a ImportOptions,
    source: &StagingTableDefinition,
) -> Projection<'a> {
    Projection::new(
        builder.dialect(),
        builder.null_style(),
        options,
        source.is_typed(),
    )
}

pub fn create_table(
    builder: &dyn SqlCommandBuilder,
    table: &TableDefinition,
    temporary: bool,
) -> String {
    let create = table.columns.iter().fold(
        CreateTableBuilder::new(TableRef::of(table))
            .temporary(temporary)
            .layout(table.layout.clone()),
        |create, column| create.column_def(column),
    );
    to_sql(&create.build(), builder.dialect())
}

/// `SELECT cols, ROW_NUMBER() OVER (PARTITION BY pk ORDER BY pk) AS rn FROM source`
fn numbered_rows(source: &StagingTableDefinition, primary_keys: &[String]) -> Select {
    let keys: Vec<Expr> = primary_keys.iter().map(|pk| ident(pk)).collect();
    let mut columns: Vec<Expr> = source.column_names().iter().map(|c| ident(c)).collect();
    columns.push(alias(
        Expr::RowNumber {
            partition_by: keys.clone(),
            order_by: keys,
        },
        ROW_NUMBER_COLUMN,
    ));

    SelectBuilder::new()
        .select(columns)
        .from(TableRef::of(source.table()), None)
        .build()
}

fn first_row_per_key(columns: Vec<Expr>, numbered: Select) -> Select {
    SelectBuilder::new()
        .select(columns)
        .from_subquery(numbered, DEDUP_ALIAS)
        .where_clause(eq(
            aliased(DEDUP_ALIAS, ROW_NUMBER_COLUMN),
            Expr::Literal("1".to_string()),
        ))
        .build()
}

pub fn dedup(
    builder: &dyn SqlCommandBuilder,
    source: &StagingTableDefinition,
    dedup: &StagingTableDefinition,
    primary_keys: &[String],
) -> Result<String, BuilderError> {
    if primary_keys.is_empty() {
        return Ok(String::new());
    }

    let missing = source
        .table()
        .missing_columns(primary_keys, NameMatching::Strict);
    if !missing.is_empty() {
        return Err(BuilderError::UnknownPrimaryKeys {
            table: source.name().to_string(),
            columns: missing.join(", "),
        });
    }

    let columns = dedup.column_names();
    let select = first_row_per_key(
        columns.iter().map(|c| aliased(DEDUP_ALIAS, c)).collect(),
        numbered_rows(source, primary_keys),
    );
    let insert = InsertBuilder::new(TableRef::of(dedup.table()))
        .columns(&columns)
        .select(select);
    Ok(to_sql(&insert, builder.dialect()))
}

pub fn insert_all(
    builder: &dyn SqlCommandBuilder,
    source: &StagingTableDefinition,
    destination: &TableDefinition,
    options: &ImportOptions,
    timestamp: &str,
) -> Result<String, BuilderError> {
    let columns = import_columns(options);
    let pairs = pair_columns(&columns, destination, options.column_matching)?;
    let timestamp_column = timestamp_column(destination, options)?;
    let projection = projection(builder, options, source);

    let mut target = Vec::with_capacity(pairs.len() + 1);
    let mut values = Vec::with_capacity(pairs.len() + 1);
    for pair in &pairs {
        target.push(pair.destination.name.clone());
        values.push(projection.value(ident(pair.source), pair, false));
    }
    if let Some(column) = timestamp_column {
        target.push(column.name.clone());
        values.push(projection.timestamp(timestamp, column, false));
    }

    let select = SelectBuilder::new()
        .select(values)
        .from(TableRef::of(source.table()), None)
        .build();
    let insert = InsertBuilder::new(TableRef::of(destination))
        .columns(&target)
        .select(select);
    Ok(to_sql(&insert, builder.dialect()))
}

pub fn update_with_pk(
    builder: &dyn SqlCommandBuilder,
    staging: &StagingTableDefinition,
    destination: &TableDefinition,
    options: &ImportOptions,
    timestamp: &str,
    target: UpdateTarget,
) -> Result<String, BuilderError> {
    let columns = import_columns(options);
    let pairs = pair_columns(&columns, destination, options.column_matching)?;
    let keys = primary_key_pairs(&pairs, destination)?;
    let timestamp_column = timestamp_column(destination, options)?;
    let projection = projection(builder, options, staging);

    let values: Vec<&ColumnPair> = pairs
        .iter()
        .filter(|p| !destination.is_primary_key(&p.destination.name))
        .collect();
    if values.is_empty() {
        return Ok(String::new());
    }

    let dest_ref = TableRef::of(destination);
    let dest_column = |name: &str| match target {
        UpdateTarget::Qualified => table_qualified(&dest_ref, name),
        UpdateTarget::Aliased | UpdateTarget::AliasedJoined => aliased(DESTINATION_ALIAS, name),
    };

    let mut update = UpdateBuilder::new(dest_ref.clone());
    if target != UpdateTarget::Qualified {
        update = update.alias(DESTINATION_ALIAS);
    }
    for pair in &values {
        update = update.set(
            &pair.destination.name,
            projection.value(aliased(SOURCE_ALIAS, pair.source), pair, false),
        );
    }
    if let Some(column) = timestamp_column {
        update = update.set(&column.name, projection.timestamp(timestamp, column, false));
    }

    if target == UpdateTarget::AliasedJoined {
        update = update.from(dest_ref.clone(), Some(DESTINATION_ALIAS));
    }
    update = update.from(TableRef::of(staging.table()), Some(SOURCE_ALIAS));

    let mut conditions: Vec<Expr> = keys
        .iter()
        .map(|pair| {
            eq(
                dest_column(&pair.destination.name),
                projection.value(aliased(SOURCE_ALIAS, pair.source), pair, false),
            )
        })
        .collect();
    conditions.extend(or_all(
        values
            .iter()
            .map(|pair| {
                projection.changed(
                    dest_column(&pair.destination.name),
                    aliased(SOURCE_ALIAS, pair.source),
                )
            })
            .collect(),
    ));

    if let Some(condition) = and_all(conditions) {
        update = update.where_clause(condition);
    }
    Ok(to_sql(&update.build(), builder.dialect()))
}

pub fn delete_old_items(
    builder: &dyn SqlCommandBuilder,
    staging: &StagingTableDefinition,
    destination: &TableDefinition,
    options: &ImportOptions,
    style: DeleteStyle,
) -> Result<String, BuilderError> {
    let columns = import_columns(options);
    let pairs = pair_columns(&columns, destination, options.column_matching)?;
    let keys = primary_key_pairs(&pairs, destination)?;
    let projection = projection(builder, options, staging);

    let stage_ref = TableRef::of(staging.table());
    let dest_ref = TableRef::of(destination);
    let aliased_refs = style == DeleteStyle::ExistsAliased;

    let key_match = and_all(
        keys.iter()
            .map(|pair| {
                let (dest, src) = if aliased_refs {
                    (
                        aliased(DESTINATION_ALIAS, &pair.destination.name),
                        aliased(SOURCE_ALIAS, pair.source),
                    )
                } else {
                    (
                        table_qualified(&dest_ref, &pair.destination.name),
                        table_qualified(&stage_ref, pair.source),
                    )
                };
                eq(dest, projection.value(src, pair, false))
            })
            .collect(),
    )
    .ok_or_else(|| BuilderError::MissingPrimaryKey {
        table: destination.name.clone(),
    })?;

    let delete = match style {
        DeleteStyle::Using => DeleteBuilder::new(stage_ref)
            .using(dest_ref, None)
            .where_clause(key_match),
        DeleteStyle::Exists | DeleteStyle::ExistsAliased => {
            let dest_alias = aliased_refs.then_some(DESTINATION_ALIAS);
            let exists = SelectBuilder::new()
                .select(vec![Expr::Literal("*".to_string())])
                .from(dest_ref, dest_alias)
                .where_clause(key_match)
                .build();
            let delete = DeleteBuilder::new(stage_ref);
            let delete = if aliased_refs {
                delete.alias(SOURCE_ALIAS)
            } else {
                delete
            };
            delete.where_clause(Expr::Exists(Box::new(exists)))
        }
    };
    Ok(to_sql(&delete.build(), builder.dialect()))
}

/// `CREATE TABLE <target> AS SELECT` in the destination's column order.
/// Values are always cast to the destination types so the new table keeps
/// the destination's shape; destination columns absent from the source are
/// created as typed `NULL`s.
pub fn ctas(
    builder: &dyn SqlCommandBuilder,
    source: &StagingTableDefinition,
    destination: &TableDefinition,
    target_name: &str,
    options: &ImportOptions,
    timestamp: &str,
    deduplicate: bool,
) -> Result<String, BuilderError> {
    let columns = import_columns(options);
    let pairs = pair_columns(&columns, destination, options.column_matching)?;
    let timestamp_column = timestamp_column(destination, options)?;
    let projection = projection(builder, options, source);

    let source_column = |name: &str| {
        if deduplicate {
            aliased(DEDUP_ALIAS, name)
        } else {
            ident(name)
        }
    };

    let values: Vec<Expr> = destination
        .columns
        .iter()
        .map(|column| {
            let value = if let Some(pair) = pairs.iter().find(|p| p.destination.name == column.name)
            {
                projection.value(source_column(pair.source), pair, true)
            } else if timestamp_column.is_some_and(|ts| ts.name == column.name) {
                projection.timestamp(timestamp, column, true)
            } else {
                projection.cast_to(Expr::Literal("NULL".to_string()), column)
            };
            alias(value, &column.name)
        })
        .collect();

    let select = if deduplicate {
        let keys = primary_key_pairs(&pairs, destination)?;
        let key_names: Vec<String> = keys.iter().map(|p| p.source.to_string()).collect();
        first_row_per_key(values, numbered_rows(source, &key_names))
    } else {
        SelectBuilder::new()
            .select(values)
            .from(TableRef::of(source.table()), None)
            .build()
    };

    let target = destination.renamed(target_name);
    let create = CreateTableAsBuilder::new(TableRef::of(&target))
        .layout(destination.layout.clone())
        .select(select);
    Ok(to_sql(&create, builder.dialect()))
}

/// Copies a table into staging, casting to text for untyped staging.
pub fn copy_table(
    builder: &dyn SqlCommandBuilder,
    source: &TableDefinition,
    staging: &StagingTableDefinition,
    columns: &[String],
) -> String {
    let text_type = builder.dialect().text_type();
    let values: Vec<Expr> = columns
        .iter()
        .map(|c| {
            if staging.is_typed() {
                ident(c)
            } else {
                cast(ident(c), text_type.clone())
            }
        })
        .collect();
    let select = SelectBuilder::new()
        .select(values)
        .from(TableRef::of(source), None)
        .build();
    let insert = InsertBuilder::new(TableRef::of(staging.table()))
        .columns(columns)
        .select(select);
    to_sql(&insert, builder.dialect())
}
