use connectors::{
    source::{Source, TableSource},
    sql::base::connection::Connection,
};
use model::{
    core::data_type::DataType,
    schema::{column::ColumnDefinition, table::TableDefinition},
};

/// Source rows arrive as text, the way files land in staging.
pub const RAW_ACCOUNTS_DDL: &str = r#"
    CREATE TABLE raw.accounts (
        id varchar,
        name varchar,
        price varchar
    )
"#;

pub const MART_ACCOUNTS_DDL: &str = r#"
    CREATE TABLE mart.accounts (
        id integer PRIMARY KEY,
        name varchar(255),
        price decimal(12,2)
    )
"#;

/// Destination metadata matching [`MART_ACCOUNTS_DDL`].
pub fn mart_accounts() -> TableDefinition {
    TableDefinition::new(
        "mart",
        "accounts",
        vec![
            ColumnDefinition::new("id", DataType::Int).not_null(),
            ColumnDefinition::new("name", DataType::VarChar).with_length("255"),
            ColumnDefinition::new("price", DataType::Decimal).with_length("12,2"),
        ],
    )
    .with_primary_keys(&["id"])
}

pub fn raw_accounts() -> Source {
    Source::Table(TableSource {
        schema: "raw".into(),
        name: "accounts".into(),
        columns: vec!["id".into(), "name".into(), "price".into()],
        primary_keys: vec![],
    })
}

pub async fn execute(conn: &dyn Connection, sql: &str) {
    conn.execute(sql).await.expect("execute statement");
}

pub async fn insert_raw(conn: &dyn Connection, rows: &[(&str, &str, &str)]) {
    for (id, name, price) in rows {
        execute(
            conn,
            &format!("INSERT INTO raw.accounts VALUES ('{id}', '{name}', '{price}')"),
        )
        .await;
    }
}

pub async fn get_row_count(conn: &dyn Connection, table: &str) -> u64 {
    conn.query_count(&format!("SELECT COUNT(*) FROM {table}"))
        .await
        .expect("count rows")
}

/// Rows of `mart.accounts` ordered by id, every value as text.
pub async fn fetch_accounts(conn: &dyn Connection) -> Vec<Vec<Option<String>>> {
    conn.query_rows("SELECT id, name, price FROM mart.accounts ORDER BY id")
        .await
        .expect("fetch rows")
}

/// Staging and dedup tables still visible to the session.
pub async fn scratch_table_count(conn: &dyn Connection) -> u64 {
    conn.query_count("SELECT COUNT(*) FROM pg_tables WHERE left(tablename, 7) = '__temp_'")
        .await
        .expect("count scratch tables")
}

pub fn cell(rows: &[Vec<Option<String>>], row: usize, col: usize) -> Option<&str> {
    rows[row][col].as_deref()
}
