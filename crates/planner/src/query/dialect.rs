//! Defines the `Dialect` trait for warehouse-specific SQL syntax.

use crate::query::ast::common::TableRef;
use model::{
    core::{backend::BackendKind, data_type::DataType, utils::escape_string_literal},
    schema::layout::{Distribution, TableIndex, TableLayout},
};

pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect (e.g., "Snowflake", "Synapse").
    fn name(&self) -> &'static str;

    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - Snowflake, Exasol, Teradata and Redshift use double quotes: `"my_column"`
    /// - Synapse uses brackets: `[my_column]`
    /// - BigQuery uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Renders a single-quoted string literal.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", escape_string_literal(value))
    }

    /// Renders a generic `DataType` into a warehouse-specific SQL type string.
    fn render_data_type(&self, data_type: &DataType, length: Option<&str>) -> String;

    /// The widest text type, used for untyped staging columns and for
    /// comparing destination values against staging text.
    fn text_type(&self) -> String {
        self.render_data_type(&DataType::String, None)
    }

    fn render_table_ref(&self, table: &TableRef) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&table.name)
            ),
            None => self.quote_identifier(&table.name),
        }
    }

    fn create_table_prefix(&self, temporary: bool) -> &'static str {
        if temporary {
            "CREATE TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        }
    }

    /// Physical options appended after the column list (or before `AS` in a
    /// CTAS). `None` when the dialect has nothing to say about the layout.
    fn table_options(&self, _layout: &TableLayout) -> Option<String> {
        None
    }

    /// Teradata spells CTAS as `CREATE TABLE t AS (SELECT ...) WITH DATA`.
    fn ctas_wraps_select(&self) -> bool {
        false
    }

    fn render_truncate(&self, table: &TableRef) -> String {
        format!("TRUNCATE TABLE {}", self.render_table_ref(table))
    }

    fn render_rename(&self, table: &TableRef, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.render_table_ref(table),
            self.quote_identifier(new_name)
        )
    }

    fn supports_drop_if_exists(&self) -> bool {
        true
    }

    fn render_drop(&self, table: &TableRef, if_exists: bool) -> String {
        if if_exists && self.supports_drop_if_exists() {
            format!("DROP TABLE IF EXISTS {}", self.render_table_ref(table))
        } else {
            format!("DROP TABLE {}", self.render_table_ref(table))
        }
    }

    /// Empty when transactions open implicitly.
    fn begin_transaction(&self) -> &'static str {
        "BEGIN TRANSACTION"
    }

    fn commit_transaction(&self) -> &'static str {
        "COMMIT"
    }

    fn rollback_transaction(&self) -> &'static str {
        "ROLLBACK"
    }

    /// Teradata places the `FROM` clause of an `UPDATE` before `SET`.
    fn update_from_before_set(&self) -> bool {
        false
    }

    /// Whether `DELETE` can join the destination through `USING`.
    fn supports_delete_using(&self) -> bool {
        false
    }

    /// Whether the `DELETE` keyword needs a trailing `FROM`.
    fn delete_requires_from(&self) -> bool {
        true
    }
}

/// Returns the dialect implementation for a backend.
pub fn for_backend(kind: BackendKind) -> &'static dyn Dialect {
    match kind {
        BackendKind::Snowflake => &Snowflake,
        BackendKind::Synapse => &Synapse,
        BackendKind::Exasol => &Exasol,
        BackendKind::Teradata => &Teradata,
        BackendKind::BigQuery => &BigQuery,
        BackendKind::Redshift => &Redshift,
    }
}

fn double_quoted(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn sized(base: &str, length: Option<&str>) -> String {
    match length {
        Some(len) if !len.trim().is_empty() => format!("{base}({})", len.trim()),
        _ => base.to_string(),
    }
}

fn quoted_list(dialect: &dyn Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct Snowflake;

impl Dialect for Snowflake {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        double_quoted(ident)
    }

    fn render_data_type(&self, data_type: &DataType, length: Option<&str>) -> String {
        match data_type {
            DataType::String => "VARCHAR".into(),
            DataType::VarChar => sized("VARCHAR", length),
            DataType::Char => sized("CHAR", length),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Int => "INTEGER".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Decimal => sized("NUMBER", length),
            DataType::Float => "FLOAT".into(),
            DataType::Double => "DOUBLE".into(),
            DataType::Boolean => "BOOLEAN".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::Timestamp => "TIMESTAMP_NTZ".into(),
            DataType::TimestampTz => "TIMESTAMP_TZ".into(),
            DataType::Json => "VARIANT".into(),
            DataType::Binary => sized("BINARY", length),
            DataType::Custom(name) => sized(name, length),
        }
    }

    fn supports_delete_using(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct Synapse;

impl Dialect for Synapse {
    fn name(&self) -> &'static str {
        "Synapse"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn render_data_type(&self, data_type: &DataType, length: Option<&str>) -> String {
        match data_type {
            DataType::String => "NVARCHAR(4000)".into(),
            DataType::VarChar => sized("NVARCHAR", length.or(Some("4000"))),
            DataType::Char => sized("NCHAR", length),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Int => "INT".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Decimal => sized("DECIMAL", length),
            DataType::Float => "REAL".into(),
            DataType::Double => "FLOAT".into(),
            DataType::Boolean => "BIT".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::Timestamp => "DATETIME2".into(),
            DataType::TimestampTz => "DATETIMEOFFSET".into(),
            DataType::Json => "NVARCHAR(MAX)".into(),
            DataType::Binary => sized("VARBINARY", length),
            DataType::Custom(name) => sized(name, length),
        }
    }

    fn table_options(&self, layout: &TableLayout) -> Option<String> {
        let mut options = Vec::new();
        match &layout.distribution {
            Some(Distribution::Hash(columns)) => {
                options.push(format!("DISTRIBUTION = HASH({})", quoted_list(self, columns)))
            }
            Some(Distribution::RoundRobin) => options.push("DISTRIBUTION = ROUND_ROBIN".into()),
            Some(Distribution::Replicate) => options.push("DISTRIBUTION = REPLICATE".into()),
            None => {}
        }
        match &layout.index {
            Some(TableIndex::Heap) => options.push("HEAP".into()),
            Some(TableIndex::ClusteredColumnstore) => {
                options.push("CLUSTERED COLUMNSTORE INDEX".into())
            }
            Some(TableIndex::ClusteredIndex(columns)) => {
                options.push(format!("CLUSTERED INDEX ({})", quoted_list(self, columns)))
            }
            // Teradata-only hints.
            Some(TableIndex::PrimaryIndex(_)) | Some(TableIndex::NoPrimaryIndex) | None => {}
        }
        if options.is_empty() {
            None
        } else {
            Some(format!("WITH ({})", options.join(", ")))
        }
    }

    fn render_rename(&self, table: &TableRef, new_name: &str) -> String {
        format!(
            "RENAME OBJECT {} TO {}",
            self.render_table_ref(table),
            self.quote_identifier(new_name)
        )
    }

    fn render_drop(&self, table: &TableRef, if_exists: bool) -> String {
        let table_sql = self.render_table_ref(table);
        if if_exists {
            format!(
                "IF OBJECT_ID (N{}, N'U') IS NOT NULL DROP TABLE {table_sql}",
                self.quote_string(&table_sql)
            )
        } else {
            format!("DROP TABLE {table_sql}")
        }
    }

    fn delete_requires_from(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct Exasol;

impl Dialect for Exasol {
    fn name(&self) -> &'static str {
        "Exasol"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        double_quoted(ident)
    }

    fn render_data_type(&self, data_type: &DataType, length: Option<&str>) -> String {
        match data_type {
            DataType::String | DataType::Json | DataType::Binary | DataType::Time => {
                "VARCHAR(2000000)".into()
            }
            DataType::VarChar => sized("VARCHAR", length.or(Some("2000000"))),
            DataType::Char => sized("CHAR", length),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Int => "INTEGER".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Decimal => sized("DECIMAL", length),
            DataType::Float | DataType::Double => "DOUBLE PRECISION".into(),
            DataType::Boolean => "BOOLEAN".into(),
            DataType::Date => "DATE".into(),
            DataType::Timestamp => "TIMESTAMP".into(),
            DataType::TimestampTz => "TIMESTAMP WITH LOCAL TIME ZONE".into(),
            DataType::Custom(name) => sized(name, length),
        }
    }

    fn render_rename(&self, table: &TableRef, new_name: &str) -> String {
        let target = TableRef {
            schema: table.schema.clone(),
            name: new_name.to_string(),
        };
        format!(
            "RENAME TABLE {} TO {}",
            self.render_table_ref(table),
            self.render_table_ref(&target)
        )
    }

    // Exasol sessions are always inside a transaction.
    fn begin_transaction(&self) -> &'static str {
        ""
    }
}

#[derive(Debug, Clone)]
pub struct Teradata;

impl Dialect for Teradata {
    fn name(&self) -> &'static str {
        "Teradata"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        double_quoted(ident)
    }

    fn render_data_type(&self, data_type: &DataType, length: Option<&str>) -> String {
        match data_type {
            DataType::String => "VARCHAR(32000) CHARACTER SET UNICODE".into(),
            DataType::VarChar => format!(
                "{} CHARACTER SET UNICODE",
                sized("VARCHAR", length.or(Some("32000")))
            ),
            DataType::Char => format!("{} CHARACTER SET UNICODE", sized("CHAR", length)),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Int => "INTEGER".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Decimal => sized("DECIMAL", length),
            DataType::Float | DataType::Double => "FLOAT".into(),
            DataType::Boolean => "BYTEINT".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::Timestamp => "TIMESTAMP".into(),
            DataType::TimestampTz => "TIMESTAMP WITH TIME ZONE".into(),
            DataType::Json => "JSON".into(),
            DataType::Binary => sized("VARBYTE", length.or(Some("64000"))),
            DataType::Custom(name) => sized(name, length),
        }
    }

    fn create_table_prefix(&self, _temporary: bool) -> &'static str {
        "CREATE MULTISET TABLE"
    }

    fn table_options(&self, layout: &TableLayout) -> Option<String> {
        match &layout.index {
            Some(TableIndex::PrimaryIndex(columns)) if !columns.is_empty() => {
                Some(format!("PRIMARY INDEX ({})", quoted_list(self, columns)))
            }
            Some(TableIndex::NoPrimaryIndex) => Some("NO PRIMARY INDEX".into()),
            _ => None,
        }
    }

    fn ctas_wraps_select(&self) -> bool {
        true
    }

    fn render_truncate(&self, table: &TableRef) -> String {
        format!("DELETE FROM {} ALL", self.render_table_ref(table))
    }

    fn render_rename(&self, table: &TableRef, new_name: &str) -> String {
        let target = TableRef {
            schema: table.schema.clone(),
            name: new_name.to_string(),
        };
        format!(
            "RENAME TABLE {} TO {}",
            self.render_table_ref(table),
            self.render_table_ref(&target)
        )
    }

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn commit_transaction(&self) -> &'static str {
        "END TRANSACTION"
    }

    fn update_from_before_set(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct BigQuery;

impl Dialect for BigQuery {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "\\`"))
    }

    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    // BigQuery types are unsized; lengths are dropped.
    fn render_data_type(&self, data_type: &DataType, _length: Option<&str>) -> String {
        match data_type {
            DataType::String | DataType::VarChar | DataType::Char => "STRING".into(),
            DataType::SmallInt | DataType::Int | DataType::BigInt => "INT64".into(),
            DataType::Decimal => "NUMERIC".into(),
            DataType::Float | DataType::Double => "FLOAT64".into(),
            DataType::Boolean => "BOOL".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::Timestamp => "DATETIME".into(),
            DataType::TimestampTz => "TIMESTAMP".into(),
            DataType::Json => "JSON".into(),
            DataType::Binary => "BYTES".into(),
            DataType::Custom(name) => name.clone(),
        }
    }

    fn commit_transaction(&self) -> &'static str {
        "COMMIT TRANSACTION"
    }

    fn rollback_transaction(&self) -> &'static str {
        "ROLLBACK TRANSACTION"
    }

    fn delete_requires_from(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct Redshift;

impl Dialect for Redshift {
    fn name(&self) -> &'static str {
        "Redshift"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        double_quoted(ident)
    }

    fn render_data_type(&self, data_type: &DataType, length: Option<&str>) -> String {
        match data_type {
            DataType::String => "VARCHAR(65535)".into(),
            DataType::VarChar => sized("VARCHAR", length.or(Some("65535"))),
            DataType::Char => sized("CHAR", length),
            DataType::SmallInt => "SMALLINT".into(),
            DataType::Int => "INTEGER".into(),
            DataType::BigInt => "BIGINT".into(),
            DataType::Decimal => sized("DECIMAL", length),
            DataType::Float => "REAL".into(),
            DataType::Double => "DOUBLE PRECISION".into(),
            DataType::Boolean => "BOOLEAN".into(),
            DataType::Date => "DATE".into(),
            DataType::Time => "TIME".into(),
            DataType::Timestamp => "TIMESTAMP".into(),
            DataType::TimestampTz => "TIMESTAMPTZ".into(),
            DataType::Json => "SUPER".into(),
            DataType::Binary => sized("VARBYTE", length),
            DataType::Custom(name) => sized(name, length),
        }
    }

    fn table_options(&self, layout: &TableLayout) -> Option<String> {
        match &layout.distribution {
            Some(Distribution::Hash(columns)) if !columns.is_empty() => Some(format!(
                "DISTSTYLE KEY DISTKEY({})",
                quoted_list(self, &columns[..1])
            )),
            Some(Distribution::RoundRobin) => Some("DISTSTYLE EVEN".into()),
            Some(Distribution::Replicate) => Some("DISTSTYLE ALL".into()),
            _ => None,
        }
    }

    fn supports_delete_using(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_ref;

    #[test]
    fn test_quote_identifier_escapes_quote_char() {
        assert_eq!(Snowflake.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Synapse.quote_identifier("a]b"), "[a]]b]");
        assert_eq!(BigQuery.quote_identifier("col"), "`col`");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(Redshift.quote_string("it's"), "'it''s'");
        assert_eq!(BigQuery.quote_string("it's"), "'it\\'s'");
    }

    #[test]
    fn test_text_types() {
        assert_eq!(Snowflake.text_type(), "VARCHAR");
        assert_eq!(Synapse.text_type(), "NVARCHAR(4000)");
        assert_eq!(Exasol.text_type(), "VARCHAR(2000000)");
        assert_eq!(Teradata.text_type(), "VARCHAR(32000) CHARACTER SET UNICODE");
        assert_eq!(BigQuery.text_type(), "STRING");
        assert_eq!(Redshift.text_type(), "VARCHAR(65535)");
    }

    #[test]
    fn test_render_sized_types() {
        assert_eq!(
            Snowflake.render_data_type(&DataType::Decimal, Some("38,2")),
            "NUMBER(38,2)"
        );
        assert_eq!(
            Synapse.render_data_type(&DataType::VarChar, Some("255")),
            "NVARCHAR(255)"
        );
        assert_eq!(BigQuery.render_data_type(&DataType::VarChar, Some("255")), "STRING");
    }

    #[test]
    fn test_synapse_layout_options() {
        let layout = TableLayout::new(
            Some(Distribution::Hash(vec!["id".into()])),
            Some(TableIndex::ClusteredColumnstore),
        );
        assert_eq!(
            Synapse.table_options(&layout).as_deref(),
            Some("WITH (DISTRIBUTION = HASH([id]), CLUSTERED COLUMNSTORE INDEX)")
        );
        assert_eq!(
            Synapse.table_options(&TableLayout::scratch()).as_deref(),
            Some("WITH (DISTRIBUTION = ROUND_ROBIN, HEAP)")
        );
        assert!(Synapse.table_options(&TableLayout::default()).is_none());
    }

    #[test]
    fn test_teradata_and_redshift_layout_options() {
        let layout = TableLayout::new(None, Some(TableIndex::NoPrimaryIndex));
        assert_eq!(Teradata.table_options(&layout).as_deref(), Some("NO PRIMARY INDEX"));
        assert_eq!(
            Redshift.table_options(&TableLayout::scratch()).as_deref(),
            Some("DISTSTYLE EVEN")
        );
        assert!(Snowflake.table_options(&TableLayout::scratch()).is_none());
    }

    #[test]
    fn test_structural_statements() {
        let table = table_ref!("in_c", "users");
        assert_eq!(Teradata.render_truncate(&table), "DELETE FROM \"in_c\".\"users\" ALL");
        assert_eq!(
            Synapse.render_rename(&table, "users_new"),
            "RENAME OBJECT [in_c].[users] TO [users_new]"
        );
        assert_eq!(
            Exasol.render_rename(&table, "users_new"),
            "RENAME TABLE \"in_c\".\"users\" TO \"in_c\".\"users_new\""
        );
        assert_eq!(
            Redshift.render_rename(&table, "users_new"),
            "ALTER TABLE \"in_c\".\"users\" RENAME TO \"users_new\""
        );
    }

    #[test]
    fn test_drop_if_exists_per_dialect() {
        let table = table_ref!("dbo", "stage");
        assert_eq!(
            Synapse.render_drop(&table, true),
            "IF OBJECT_ID (N'[dbo].[stage]', N'U') IS NOT NULL DROP TABLE [dbo].[stage]"
        );
        assert_eq!(
            Snowflake.render_drop(&table, true),
            "DROP TABLE IF EXISTS \"dbo\".\"stage\""
        );
        assert_eq!(Teradata.render_drop(&table, true), "DROP TABLE \"dbo\".\"stage\"");
    }

    #[test]
    fn test_transaction_keywords() {
        assert_eq!(Exasol.begin_transaction(), "");
        assert_eq!(Teradata.commit_transaction(), "END TRANSACTION");
        assert_eq!(BigQuery.commit_transaction(), "COMMIT TRANSACTION");
        assert_eq!(for_backend(BackendKind::Redshift).name(), "Redshift");
    }
}
