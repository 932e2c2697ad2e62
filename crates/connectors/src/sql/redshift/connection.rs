use crate::sql::{
    base::{
        connection::{Connection, TextRow},
        error::{ConnectorError, DbError},
    },
    redshift::utils::connect_client,
};
use async_trait::async_trait;
use model::core::backend::BackendKind;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, SimpleQueryMessage};
use tracing::debug;

/// A Redshift session over the Postgres wire protocol.
///
/// Statements go through the simple query protocol: they carry inline
/// literals, and text results are what the orchestrators consume.
#[derive(Clone)]
pub struct RedshiftConnection {
    client: Arc<RwLock<Client>>,
}

impl RedshiftConnection {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(Self {
            client: Arc::new(RwLock::new(client)),
        })
    }

    async fn simple_query(&self, sql: &str) -> Result<Vec<SimpleQueryMessage>, DbError> {
        debug!(sql, "Executing Redshift statement");
        let client = self.client.write().await;
        Ok(client.simple_query(sql).await?)
    }
}

#[async_trait]
impl Connection for RedshiftConnection {
    fn backend(&self) -> BackendKind {
        BackendKind::Redshift
    }

    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        let messages = self.simple_query(sql).await?;
        Ok(messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::CommandComplete(rows) => Some(*rows),
                _ => None,
            })
            .sum())
    }

    async fn query_rows(&self, sql: &str) -> Result<Vec<TextRow>, DbError> {
        let messages = self.simple_query(sql).await?;
        Ok(messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::Row(row) => Some(
                    (0..row.len())
                        .map(|i| row.get(i).map(str::to_string))
                        .collect(),
                ),
                _ => None,
            })
            .collect())
    }
}
