use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The closed set of warehouses the import engine can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Snowflake,
    Synapse,
    Exasol,
    Teradata,
    BigQuery,
    Redshift,
}

impl BackendKind {
    pub const ALL: [BackendKind; 6] = [
        BackendKind::Snowflake,
        BackendKind::Synapse,
        BackendKind::Exasol,
        BackendKind::Teradata,
        BackendKind::BigQuery,
        BackendKind::Redshift,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Snowflake => "snowflake",
            BackendKind::Synapse => "synapse",
            BackendKind::Exasol => "exasol",
            BackendKind::Teradata => "teradata",
            BackendKind::BigQuery => "bigquery",
            BackendKind::Redshift => "redshift",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snowflake" | "sf" => Ok(BackendKind::Snowflake),
            "synapse" | "azure-synapse" => Ok(BackendKind::Synapse),
            "exasol" => Ok(BackendKind::Exasol),
            "teradata" | "td" => Ok(BackendKind::Teradata),
            "bigquery" | "bq" => Ok(BackendKind::BigQuery),
            "redshift" => Ok(BackendKind::Redshift),
            other => Err(format!("Unknown backend: {other}")),
        }
    }
}
