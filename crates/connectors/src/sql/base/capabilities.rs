use model::core::backend::BackendKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub temp_tables: bool,             // session-scoped staging tables
    pub schemaless_temp_tables: bool,  // temp tables live outside user schemas
    pub ctas: bool,                    // CREATE TABLE ... AS SELECT fast path
    pub transactional_ddl: bool,       // DROP/RENAME can run inside BEGIN/COMMIT
    pub drop_if_exists: bool,
}

impl BackendCapabilities {
    pub fn for_backend(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Snowflake => Self {
                temp_tables: true,
                schemaless_temp_tables: false,
                ctas: true,
                transactional_ddl: false,
                drop_if_exists: true,
            },
            BackendKind::Synapse => Self {
                temp_tables: false,
                schemaless_temp_tables: false,
                ctas: true,
                transactional_ddl: false,
                drop_if_exists: true,
            },
            BackendKind::Exasol => Self {
                temp_tables: false,
                schemaless_temp_tables: false,
                ctas: true,
                transactional_ddl: true,
                drop_if_exists: true,
            },
            BackendKind::Teradata => Self {
                temp_tables: false,
                schemaless_temp_tables: false,
                ctas: false,
                transactional_ddl: false,
                drop_if_exists: false,
            },
            BackendKind::BigQuery => Self {
                temp_tables: false,
                schemaless_temp_tables: false,
                ctas: true,
                transactional_ddl: false,
                drop_if_exists: true,
            },
            BackendKind::Redshift => Self {
                temp_tables: true,
                schemaless_temp_tables: true,
                ctas: true,
                transactional_ddl: true,
                drop_if_exists: true,
            },
        }
    }
}
