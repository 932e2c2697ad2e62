use crate::schema::{column::ColumnDefinition, layout::TableLayout};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableDefinitionError {
    #[error("Duplicate column names in table '{table}': {columns}")]
    DuplicateColumns { table: String, columns: String },

    #[error("Primary key columns not found in table '{table}': {columns}")]
    UnknownPrimaryKeys { table: String, columns: String },
}

/// How column names are compared between a source and a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    #[default]
    Strict,
    CaseInsensitive,
}

impl NameMatching {
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            NameMatching::Strict => a == b,
            NameMatching::CaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// A physical table, either a destination read from warehouse metadata or a
/// table synthesized by the import engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub layout: TableLayout,
}

impl TableDefinition {
    pub fn new(schema: &str, name: &str, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            columns,
            primary_keys: Vec::new(),
            temporary: false,
            layout: TableLayout::default(),
        }
    }

    pub fn with_primary_keys(mut self, keys: &[&str]) -> Self {
        self.primary_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Checks the structural invariants: unique column names and primary
    /// keys drawn from the column set.
    pub fn validate(&self) -> Result<(), TableDefinitionError> {
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| !seen.insert(c.name.as_str()))
            .map(|c| c.name.as_str())
            .collect();
        if !duplicates.is_empty() {
            return Err(TableDefinitionError::DuplicateColumns {
                table: self.name.clone(),
                columns: duplicates.join(", "),
            });
        }

        let unknown: Vec<&str> = self
            .primary_keys
            .iter()
            .filter(|pk| !self.has_column(pk, NameMatching::Strict))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(TableDefinitionError::UnknownPrimaryKeys {
                table: self.name.clone(),
                columns: unknown.join(", "),
            });
        }

        Ok(())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str, matching: NameMatching) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| matching.matches(&c.name, name))
    }

    pub fn has_column(&self, name: &str, matching: NameMatching) -> bool {
        self.column(name, matching).is_some()
    }

    pub fn has_primary_keys(&self) -> bool {
        !self.primary_keys.is_empty()
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys
            .iter()
            .any(|pk| pk.eq_ignore_ascii_case(column))
    }

    /// Names from `candidates` that this table does not have.
    pub fn missing_columns(&self, candidates: &[String], matching: NameMatching) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| !self.has_column(c, matching))
            .cloned()
            .collect()
    }

    /// A copy of this definition under a different name, keeping columns,
    /// keys and layout. Used for dedup scratch tables and CTAS swaps.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            temporary: false,
            ..self.clone()
        }
    }
}

/// The ephemeral table rows land in before they are merged.
///
/// Staging columns are text unless the definition was synthesized as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingTableDefinition {
    table: TableDefinition,
    typed: bool,
}

impl StagingTableDefinition {
    pub fn untyped(table: TableDefinition) -> Self {
        Self {
            table,
            typed: false,
        }
    }

    pub fn typed(table: TableDefinition) -> Self {
        Self { table, typed: true }
    }

    pub fn table(&self) -> &TableDefinition {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn schema(&self) -> &str {
        &self.table.schema
    }

    pub fn is_typed(&self) -> bool {
        self.typed
    }

    pub fn is_temporary(&self) -> bool {
        self.table.temporary
    }

    pub fn column_names(&self) -> Vec<String> {
        self.table.column_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::DataType;

    fn users() -> TableDefinition {
        TableDefinition::new(
            "in_c",
            "users",
            vec![
                ColumnDefinition::new("id", DataType::Int),
                ColumnDefinition::new("Name", DataType::VarChar),
            ],
        )
        .with_primary_keys(&["id"])
    }

    #[test]
    fn test_validate_accepts_well_formed_table() {
        assert!(users().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_columns() {
        let mut table = users();
        table.columns.push(ColumnDefinition::text("id"));
        assert_eq!(
            table.validate(),
            Err(TableDefinitionError::DuplicateColumns {
                table: "users".to_string(),
                columns: "id".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_unknown_primary_key() {
        let table = users().with_primary_keys(&["id", "email"]);
        assert!(matches!(
            table.validate(),
            Err(TableDefinitionError::UnknownPrimaryKeys { columns, .. }) if columns == "email"
        ));
    }

    #[test]
    fn test_missing_columns_honors_matching() {
        let table = users();
        let candidates = vec!["name".to_string(), "c1".to_string()];
        assert_eq!(
            table.missing_columns(&candidates, NameMatching::Strict),
            vec!["name".to_string(), "c1".to_string()]
        );
        assert_eq!(
            table.missing_columns(&candidates, NameMatching::CaseInsensitive),
            vec!["c1".to_string()]
        );
    }

    #[test]
    fn test_renamed_keeps_shape() {
        let copy = users().temporary().renamed("users_dedup");
        assert_eq!(copy.name, "users_dedup");
        assert_eq!(copy.primary_keys, vec!["id".to_string()]);
        assert!(!copy.temporary);
    }
}
