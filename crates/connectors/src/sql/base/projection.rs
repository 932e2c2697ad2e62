//! Per-column value expressions shared by the insert, update and CTAS shapes.

use crate::sql::base::builder::BuilderError;
use model::{
    import::{TIMESTAMP_COLUMN_NAME, options::ImportOptions},
    schema::{
        column::ColumnDefinition,
        table::{NameMatching, TableDefinition},
    },
};
use planner::query::{
    ast::expr::Expr, cast, coalesce_empty, dialect::Dialect, eq, func, not_eq, string,
};

pub const SOURCE_ALIAS: &str = "src";
pub const DESTINATION_ALIAS: &str = "dest";
pub const DEDUP_ALIAS: &str = "a";
pub const ROW_NUMBER_COLUMN: &str = "_row_number_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullStyle {
    /// `NULLIF(c, '')`
    Nullif,
    /// `IFF(c = '', NULL, c)`
    Iff,
}

impl NullStyle {
    pub fn apply(&self, expr: Expr) -> Expr {
        match self {
            NullStyle::Nullif => func("NULLIF", vec![expr, string("")]),
            NullStyle::Iff => func(
                "IFF",
                vec![
                    eq(expr.clone(), string("")),
                    Expr::Literal("NULL".to_string()),
                    expr,
                ],
            ),
        }
    }
}

/// A source column and the destination column it lands in.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPair<'a> {
    pub source: &'a str,
    pub destination: &'a ColumnDefinition,
}

/// Source columns that are projected from staging. A staged `_timestamp`
/// column is projected like any other column.
pub fn import_columns(options: &ImportOptions) -> Vec<String> {
    options.columns.clone()
}

/// Pairs every source column with its destination column, failing with the
/// full list of columns the destination lacks.
pub fn pair_columns<'a>(
    columns: &'a [String],
    destination: &'a TableDefinition,
    matching: NameMatching,
) -> Result<Vec<ColumnPair<'a>>, BuilderError> {
    let missing = destination.missing_columns(columns, matching);
    if !missing.is_empty() {
        return Err(BuilderError::UnknownColumns {
            table: destination.name.clone(),
            columns: missing.join(", "),
        });
    }

    Ok(columns
        .iter()
        .filter_map(|c| {
            destination.column(c, matching).map(|d| ColumnPair {
                source: c.as_str(),
                destination: d,
            })
        })
        .collect())
}

/// The destination's timestamp column when timestamps are on and the
/// source does not already carry one.
pub fn timestamp_column<'a>(
    destination: &'a TableDefinition,
    options: &ImportOptions,
) -> Result<Option<&'a ColumnDefinition>, BuilderError> {
    let staged = options
        .columns
        .iter()
        .any(|c| options.column_matching.matches(c, TIMESTAMP_COLUMN_NAME));
    if !options.use_timestamp || staged {
        return Ok(None);
    }
    destination
        .column(TIMESTAMP_COLUMN_NAME, options.column_matching)
        .map(Some)
        .ok_or_else(|| BuilderError::UnknownColumns {
            table: destination.name.clone(),
            columns: TIMESTAMP_COLUMN_NAME.to_string(),
        })
}

/// Source pairs for each destination primary key, in key order.
pub fn primary_key_pairs<'a>(
    pairs: &[ColumnPair<'a>],
    destination: &TableDefinition,
) -> Result<Vec<ColumnPair<'a>>, BuilderError> {
    if !destination.has_primary_keys() {
        return Err(BuilderError::MissingPrimaryKey {
            table: destination.name.clone(),
        });
    }

    let mut found = Vec::with_capacity(destination.primary_keys.len());
    let mut missing = Vec::new();
    for pk in &destination.primary_keys {
        match pairs.iter().find(|p| p.destination.name == *pk) {
            Some(pair) => found.push(*pair),
            None => missing.push(pk.as_str()),
        }
    }

    if !missing.is_empty() {
        return Err(BuilderError::UnknownPrimaryKeys {
            table: destination.name.clone(),
            columns: missing.join(", "),
        });
    }
    Ok(found)
}

/// Builds the value expressions projected out of a staging table.
pub struct Projection<'a> {
    dialect: &'a dyn Dialect,
    null_style: NullStyle,
    options: &'a ImportOptions,
    typed_source: bool,
}

impl<'a> Projection<'a> {
    pub fn new(
        dialect: &'a dyn Dialect,
        null_style: NullStyle,
        options: &'a ImportOptions,
        typed_source: bool,
    ) -> Self {
        Self {
            dialect,
            null_style,
            options,
            typed_source,
        }
    }

    /// The value written for one column. Listed columns turn `''` into
    /// `NULL`, the rest default `NULL` to `''`. A value cast to a non-string
    /// type turns `''` into `NULL` as well, since `''` has no such
    /// representation. Typed non-string staging values pass through.
    pub fn value(&self, source: Expr, pair: &ColumnPair, force_cast: bool) -> Expr {
        let is_string = pair.destination.data_type.is_string();
        let casts = force_cast || self.options.casts_to_destination();

        let expr = if self.typed_source && !is_string {
            source
        } else if self.options.converts_to_null(pair.source) || (casts && !is_string) {
            self.null_style.apply(source)
        } else {
            coalesce_empty(source)
        };

        if casts {
            self.cast_to(expr, pair.destination)
        } else {
            expr
        }
    }

    pub fn timestamp(&self, literal: &str, column: &ColumnDefinition, force_cast: bool) -> Expr {
        if force_cast || self.options.casts_to_destination() {
            self.cast_to(string(literal), column)
        } else {
            string(literal)
        }
    }

    pub fn cast_to(&self, expr: Expr, column: &ColumnDefinition) -> Expr {
        let data_type = self
            .dialect
            .render_data_type(&column.data_type, column.length.as_deref());
        cast(expr, data_type)
    }

    /// `COALESCE(CAST(dest AS text), '') <> COALESCE(src, '')`
    pub fn changed(&self, destination: Expr, source: Expr) -> Expr {
        let text_type = self.dialect.text_type();
        let source = if self.typed_source {
            cast(source, text_type.clone())
        } else {
            source
        };
        not_eq(
            coalesce_empty(cast(destination, text_type)),
            coalesce_empty(source),
        )
    }
}
