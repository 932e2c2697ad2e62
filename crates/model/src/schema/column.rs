use crate::core::data_type::DataType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    /// Length or precision exactly as the warehouse reports it, e.g. `255` or `38,2`.
    pub length: Option<String>,
    pub nullable: bool,
    pub default: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            length: None,
            nullable: true,
            default: None,
        }
    }

    /// An untyped staging column: every staging value arrives as text.
    pub fn text(name: &str) -> Self {
        Self::new(name, DataType::String)
    }

    pub fn with_length(mut self, length: impl Into<String>) -> Self {
        self.length = Some(length.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}
