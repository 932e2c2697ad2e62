//! Physical placement hints. Dialects that have no notion of a hint ignore it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    pub distribution: Option<Distribution>,
    pub index: Option<TableIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "columns", rename_all = "snake_case")]
pub enum Distribution {
    Hash(Vec<String>),
    RoundRobin,
    Replicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "columns", rename_all = "snake_case")]
pub enum TableIndex {
    ClusteredColumnstore,
    Heap,
    ClusteredIndex(Vec<String>),
    /// Teradata row placement.
    PrimaryIndex(Vec<String>),
    NoPrimaryIndex,
}

impl TableLayout {
    pub fn new(distribution: Option<Distribution>, index: Option<TableIndex>) -> Self {
        Self {
            distribution,
            index,
        }
    }

    /// Layout used for scratch tables that are written once and read once.
    pub fn scratch() -> Self {
        Self {
            distribution: Some(Distribution::RoundRobin),
            index: Some(TableIndex::Heap),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distribution.is_none() && self.index.is_none()
    }
}
